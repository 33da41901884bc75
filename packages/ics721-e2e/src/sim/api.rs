use bech32::{FromBase32, ToBase32, Variant};
use cosmwasm_std::{
    instantiate2_address, Addr, Api, CanonicalAddr, RecoverPubkeyError, StdError, StdResult,
    Storage, VerificationError,
};
use cw_multi_test::AddressGenerator;
use sha2::{Digest, Sha256};

/// Addresses of one simulated chain. Every chain has its own prefix, so an
/// address is only valid where it was made.
pub struct Bech32Api {
    prefix: String,
}

impl Bech32Api {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Stable account address for a seed, e.g. a key mnemonic.
    pub fn addr_make(&self, seed: &str) -> StdResult<Addr> {
        self.encode(&Sha256::digest(seed))
    }

    fn encode(&self, bytes: &[u8]) -> StdResult<Addr> {
        bech32::encode(&self.prefix, bytes.to_base32(), Variant::Bech32)
            .map(Addr::unchecked)
            .map_err(|e| StdError::generic_err(format!("bech32 encoding on {}: {e}", self.prefix)))
    }

    /// Raw bytes of `input`, if it is plain bech32 under this chain's prefix.
    fn decode(&self, input: &str) -> Option<Vec<u8>> {
        match bech32::decode(input).ok()? {
            (prefix, data, Variant::Bech32) if prefix == self.prefix => {
                Vec::<u8>::from_base32(&data).ok()
            }
            _ => None,
        }
    }
}

impl Api for Bech32Api {
    fn addr_validate(&self, input: &str) -> StdResult<Addr> {
        let addr = self.addr_humanize(&self.addr_canonicalize(input)?)?;
        if addr.as_str() != input {
            return Err(StdError::generic_err(format!(
                "address {input} is not normalized"
            )));
        }
        Ok(addr)
    }

    fn addr_canonicalize(&self, input: &str) -> StdResult<CanonicalAddr> {
        self.decode(input).map(CanonicalAddr::from).ok_or_else(|| {
            StdError::generic_err(format!("{input} is no {} address", self.prefix))
        })
    }

    fn addr_humanize(&self, canonical: &CanonicalAddr) -> StdResult<Addr> {
        self.encode(canonical.as_slice())
    }

    // no contract under test verifies signatures

    fn secp256k1_verify(&self, _: &[u8], _: &[u8], _: &[u8]) -> Result<bool, VerificationError> {
        Err(VerificationError::unknown_err(0))
    }

    fn secp256k1_recover_pubkey(
        &self,
        _: &[u8],
        _: &[u8],
        _: u8,
    ) -> Result<Vec<u8>, RecoverPubkeyError> {
        Err(RecoverPubkeyError::unknown_err(0))
    }

    fn ed25519_verify(&self, _: &[u8], _: &[u8], _: &[u8]) -> Result<bool, VerificationError> {
        Err(VerificationError::unknown_err(0))
    }

    fn ed25519_batch_verify(
        &self,
        _: &[&[u8]],
        _: &[&[u8]],
        _: &[&[u8]],
    ) -> Result<bool, VerificationError> {
        Err(VerificationError::unknown_err(0))
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "contract", prefix = %self.prefix, "{message}");
    }
}

/// non-predictable contract address generator, see `BuildContractAddressClassic`
/// implementation in wasmd: https://github.com/CosmWasm/wasmd/blob/main/x/wasm/keeper/addresses.go#L35-L42
fn classic_address(code_id: u64, instance_id: u64) -> CanonicalAddr {
    let key = [
        b"wasm\0".as_slice(),
        &code_id.to_be_bytes(),
        &instance_id.to_be_bytes(),
    ]
    .concat();
    Sha256::new()
        .chain_update(Sha256::digest(b"module"))
        .chain_update(key)
        .finalize()
        .to_vec()
        .into()
}

/// Contract addresses the way wasmd derives them, so they look like the
/// addresses a live chain hands out.
#[derive(Default)]
pub struct WasmdAddresses;

impl AddressGenerator for WasmdAddresses {
    fn contract_address(
        &self,
        api: &dyn Api,
        _storage: &mut dyn Storage,
        code_id: u64,
        instance_id: u64,
    ) -> anyhow::Result<Addr> {
        Ok(api.addr_humanize(&classic_address(code_id, instance_id))?)
    }

    fn predictable_contract_address(
        &self,
        api: &dyn Api,
        _storage: &mut dyn Storage,
        _code_id: u64,
        _instance_id: u64,
        checksum: &[u8],
        creator: &CanonicalAddr,
        salt: &[u8],
    ) -> anyhow::Result<Addr> {
        Ok(api.addr_humanize(&instantiate2_address(checksum, creator, salt)?)?)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn made_addresses_validate_on_their_own_chain_only() {
        let wasm = Bech32Api::new("wasm");
        let osmo = Bech32Api::new("osmo");
        let addr = wasm.addr_make("sender").unwrap();

        assert!(addr.as_str().starts_with("wasm1"));
        assert_eq!(wasm.addr_validate(addr.as_str()).unwrap(), addr);
        assert!(osmo.addr_validate(addr.as_str()).is_err());
        assert_eq!(wasm.addr_make("sender").unwrap(), addr);
    }

    #[rstest]
    #[case::not_bech32("sender")]
    #[case::mixed_case("wasm1QYQSZQGPqyqszqgpqyqszqgp")]
    #[case::empty("")]
    fn malformed_addresses_are_refused(#[case] input: &str) {
        assert!(Bech32Api::new("wasm").addr_validate(input).is_err());
    }

    #[test]
    fn canonical_bytes_survive_humanize() {
        let api = Bech32Api::new("juno");
        let addr = api.addr_make("relayer").unwrap();
        let canonical = api.addr_canonicalize(addr.as_str()).unwrap();
        assert_eq!(canonical.len(), 32);
        assert_eq!(api.addr_humanize(&canonical).unwrap(), addr);
    }

    #[test]
    fn contract_addresses_differ_per_instance() {
        let first = classic_address(1, 1);
        assert_ne!(first, classic_address(1, 2));
        assert_ne!(first, classic_address(2, 1));
        assert_eq!(first.len(), 32);
    }
}
