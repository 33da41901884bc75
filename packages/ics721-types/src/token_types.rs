use std::fmt;
use std::ops::Deref;

use cosmwasm_schema::cw_serde;

/// Identifies a token inside a class.
#[cw_serde]
pub struct TokenId(String);

/// Identifies an NFT class (collection) across chains.
///
/// A class minted natively on a chain is identified by its cw721
/// contract address. Each hop prepends the receiving end of the channel,
/// so a voucher class on the destination reads
/// `{dest_port}/{dest_channel}/{source_class}`.
#[cw_serde]
pub struct ClassId(String);

impl TokenId {
    pub fn new(token_id: impl Into<String>) -> Self {
        Self(token_id.into())
    }
}

impl ClassId {
    pub fn new(class_id: impl Into<String>) -> Self {
        Self(class_id.into())
    }

    /// Class id of the voucher collection created on the receiving chain
    /// when `source` arrives over `dest_port`/`dest_channel`.
    pub fn voucher(dest_port: &str, dest_channel: &str, source: &str) -> Self {
        Self(format!("{dest_port}/{dest_channel}/{source}"))
    }

    /// Strips `{port}/{channel}/` if this class id was minted as a voucher
    /// over that channel end, yielding the class id one hop closer to the
    /// origin.
    pub fn strip_hop(&self, port: &str, channel: &str) -> Option<&str> {
        self.0
            .strip_prefix(port)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| rest.strip_prefix(channel))
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }
}

impl From<ClassId> for String {
    fn from(c: ClassId) -> Self {
        c.0
    }
}

impl From<TokenId> for String {
    fn from(t: TokenId) -> Self {
        t.0
    }
}

impl Deref for ClassId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Deref for TokenId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn voucher_class_id_is_port_channel_source() {
        let class_id = ClassId::voucher("wasm.osmo1bridge", "channel-3", "wasm1collection");
        assert_eq!(&*class_id, "wasm.osmo1bridge/channel-3/wasm1collection");
        // deterministic
        assert_eq!(
            class_id,
            ClassId::voucher("wasm.osmo1bridge", "channel-3", "wasm1collection")
        );
    }

    #[rstest]
    #[case("wasm.b/channel-0/wasm1nft", Some("wasm1nft"))]
    #[case("wasm.b/channel-0/wasm.a/channel-4/wasm1nft", Some("wasm.a/channel-4/wasm1nft"))]
    #[case("wasm.b/channel-1/wasm1nft", None)]
    #[case("wasm.b/channel-0/", None)]
    #[case("wasm1nft", None)]
    fn strip_hop(#[case] class_id: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            ClassId::new(class_id).strip_hop("wasm.b", "channel-0"),
            expected
        );
    }
}
