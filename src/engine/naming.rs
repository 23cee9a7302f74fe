//! Download file naming

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::domain::PhotoSpec;

/// Product name used as the file name prefix when none is configured
pub const DEFAULT_PRODUCT_NAME: &str = "证件照";

/// RFC 5987 attr-char complement: everything except ALPHA / DIGIT / "!#$&+-.^_`|~"
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `<product>-<spec name>-<unix millis>.png`
pub fn export_file_name(product_name: &str, spec: &PhotoSpec, at: DateTime<Utc>) -> String {
    format!("{}-{}-{}.png", product_name, spec.name, at.timestamp_millis())
}

/// `Content-Disposition` value carrying a UTF-8 file name
pub fn content_disposition(file_name: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, ATTR_CHAR)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_spec;
    use chrono::TimeZone;

    #[test]
    fn test_export_file_name() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            export_file_name(DEFAULT_PRODUCT_NAME, default_spec(), at),
            "证件照-标准二寸-1700000000123.png"
        );
    }

    #[test]
    fn test_content_disposition_is_ascii() {
        let header = content_disposition("证件照-a b.png");
        assert!(header.is_ascii());
        assert!(header.starts_with("attachment; filename*=UTF-8''"));
        assert!(header.ends_with("-a%20b.png"));
    }
}
