use serde::{Deserialize, Serialize};

/// Supported ebInterface schema versions, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EbVersion {
    #[serde(rename = "4.0")]
    V4_0,
    #[serde(rename = "4.1")]
    V4_1,
    #[serde(rename = "4.2")]
    V4_2,
    #[serde(rename = "4.3")]
    V4_3,
    #[serde(rename = "5.0")]
    V5_0,
    #[serde(rename = "6.0")]
    V6_0,
}

impl EbVersion {
    pub const ALL: [EbVersion; 6] = [
        Self::V4_0,
        Self::V4_1,
        Self::V4_2,
        Self::V4_3,
        Self::V5_0,
        Self::V6_0,
    ];

    /// The most recent version.
    pub const LATEST: EbVersion = Self::V6_0;

    /// Root element namespace URI.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::V4_0 => "http://www.ebinterface.at/schema/4p0/",
            Self::V4_1 => "http://www.ebinterface.at/schema/4p1/",
            Self::V4_2 => "http://www.ebinterface.at/schema/4p2/",
            Self::V4_3 => "http://www.ebinterface.at/schema/4p3/",
            Self::V5_0 => "http://www.ebinterface.at/schema/5p0/",
            Self::V6_0 => "http://www.ebinterface.at/schema/6p0/",
        }
    }

    /// Look up a version by its namespace URI.
    pub fn from_namespace(ns: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.namespace() == ns)
    }

    /// Human readable version, e.g. `"4.3"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V4_0 => "4.0",
            Self::V4_1 => "4.1",
            Self::V4_2 => "4.2",
            Self::V4_3 => "4.3",
            Self::V5_0 => "5.0",
            Self::V6_0 => "6.0",
        }
    }

    /// `CountryCode` is an ISO 3166-1 enumeration (4.0 and 4.1) rather
    /// than free text.
    pub fn restricts_country_codes(self) -> bool {
        self <= Self::V4_1
    }

    pub fn supports_payable_amount(self) -> bool {
        self >= Self::V4_1
    }

    pub fn supports_payment_comment(self) -> bool {
        self >= Self::V4_2
    }

    pub fn supports_prepaid_amount(self) -> bool {
        self >= Self::V4_3
    }

    pub fn supports_net_amount(self) -> bool {
        self >= Self::V5_0
    }

    /// 5.0 replaced `VAT/Item` and `VATRate` with `TaxItem`.
    pub fn uses_tax_items(self) -> bool {
        self >= Self::V5_0
    }

    /// 5.0 moved the contact person out of `Address` into a `Contact` block.
    pub fn has_separate_contact(self) -> bool {
        self >= Self::V5_0
    }
}

impl std::fmt::Display for EbVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_round_trip() {
        for v in EbVersion::ALL {
            assert_eq!(EbVersion::from_namespace(v.namespace()), Some(v));
        }
        assert_eq!(EbVersion::from_namespace("http://www.ebinterface.at/schema/3p02/"), None);
    }

    #[test]
    fn capabilities_by_version() {
        assert!(EbVersion::V4_0.restricts_country_codes());
        assert!(EbVersion::V4_1.restricts_country_codes());
        assert!(!EbVersion::V4_2.restricts_country_codes());

        assert!(!EbVersion::V4_0.supports_payable_amount());
        assert!(EbVersion::V4_1.supports_payable_amount());
        assert!(!EbVersion::V4_2.supports_prepaid_amount());
        assert!(EbVersion::V4_3.supports_prepaid_amount());
        assert!(!EbVersion::V4_3.uses_tax_items());
        assert!(EbVersion::V5_0.uses_tax_items());
        assert!(EbVersion::V6_0.supports_net_amount());
    }

    #[test]
    fn serde_uses_dotted_version() {
        assert_eq!(serde_json::to_string(&EbVersion::V4_3).unwrap(), "\"4.3\"");
        let v: EbVersion = serde_json::from_str("\"6.0\"").unwrap();
        assert_eq!(v, EbVersion::V6_0);
    }
}
