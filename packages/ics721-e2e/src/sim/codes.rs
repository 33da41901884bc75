use std::{collections::BTreeMap, io};

use cosmwasm_std::Empty;
use cw_multi_test::Contract;

use crate::{error::E2eError, provision::ArtifactStore};

type BuildContract = fn() -> Box<dyn Contract<Empty>>;

#[derive(Clone, Copy)]
struct NativeCode {
    build: BuildContract,
    ibc: bool,
}

/// Contracts linked into the test binary, standing in for wasm files.
///
/// As an [`ArtifactStore`] it hands out the artifact name itself as the
/// "binary"; uploading those bytes to a simulated chain stores the
/// registered contract.
#[derive(Clone, Default)]
pub struct NativeCodes {
    codes: BTreeMap<String, NativeCode>,
}

impl NativeCodes {
    pub fn register(mut self, artifact: &str, build: BuildContract) -> Self {
        self.codes
            .insert(artifact.to_string(), NativeCode { build, ibc: false });
        self
    }

    /// Registers a contract that binds an IBC port on instantiate.
    pub fn register_ibc(mut self, artifact: &str, build: BuildContract) -> Self {
        self.codes
            .insert(artifact.to_string(), NativeCode { build, ibc: true });
        self
    }

    /// Contract behind uploaded bytes, and whether it speaks IBC.
    pub(crate) fn resolve(&self, wasm: &[u8]) -> Option<(Box<dyn Contract<Empty>>, bool)> {
        let name = std::str::from_utf8(wasm).ok()?;
        self.codes
            .get(name)
            .map(|code| ((code.build)(), code.ibc))
    }
}

impl ArtifactStore for NativeCodes {
    fn load(&self, path: &str) -> Result<Vec<u8>, E2eError> {
        if self.codes.contains_key(path) {
            Ok(path.as_bytes().to_vec())
        } else {
            Err(E2eError::Artifact {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "no native contract registered"),
            })
        }
    }
}
