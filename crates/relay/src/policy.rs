//! Extension whitelist applied before any network transfer or storage
//! allocation.

/// Extensions accepted for relaying, matched case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Human-readable list used in the rejection notice.
pub const SUPPORTED_FORMATS_LABEL: &str = "PDF, PNG, JPEG";

/// Whether a declared file name passes the extension whitelist.
pub fn is_supported(declared_name: &str) -> bool {
    extension_of(declared_name)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// The extension of a declared file name, if it has one.
pub fn extension_of(declared_name: &str) -> Option<&str> {
    std::path::Path::new(declared_name)
        .extension()
        .and_then(|ext| ext.to_str())
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("report.pdf")]
    #[case("diagram.png")]
    #[case("photo.jpg")]
    #[case("scan.jpeg")]
    #[case("SHOUTY.PDF")]
    #[case("Mixed.JpEg")]
    #[case("photo_AQADAgAT.jpg")]
    fn accepts_whitelisted_extensions(#[case] name: &str) {
        assert!(is_supported(name), "{name} should be accepted");
    }

    #[rstest]
    #[case("setup.exe")]
    #[case("notes.docx")]
    #[case("archive.tar.gz")]
    #[case("README")]
    #[case("trailing.")]
    #[case("")]
    fn rejects_everything_else(#[case] name: &str) {
        assert!(!is_supported(name), "{name} should be rejected");
    }

    #[test]
    fn extension_of_reports_the_final_suffix() {
        assert_eq!(extension_of("a.b.PDF"), Some("PDF"));
        assert_eq!(extension_of("noext"), None);
    }
}
