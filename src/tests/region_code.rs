pub struct RegionCode {}

impl RegionCode {
    pub fn ca() -> &'static str {
        "CA"
    }

    pub fn gb() -> &'static str {
        "GB"
    }

    pub fn un001() -> &'static str {
        "001"
    }

    pub fn us() -> &'static str {
        "US"
    }

    pub fn zz() -> &'static str {
        "ZZ"
    }
}
