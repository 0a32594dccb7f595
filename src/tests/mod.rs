mod region_code;
pub(crate) mod test_metadata;
