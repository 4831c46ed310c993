//! Checks on the UBL header that run before any field is mapped.

use super::{Context, trimmed};
use crate::core::Text;
use crate::ubl::{Document, DocumentKind};

const UBL_VERSIONS: &[&str] = &["2.0", "2.1", "2.2"];

const INVOICE_TYPE_CODES: &[&str] = &["380", "326", "384", "386", "389", "393", "395"];

const CREDIT_NOTE_TYPE_CODES: &[&str] = &["381", "396"];

/// Profiles recognised for informational purposes only.
const KNOWN_PROFILES: &[&str] = &[
    "urn:www.cenbii.eu:profile:bii04:ver1.0",
    "urn:www.cenbii.eu:profile:bii04:ver2.0",
    "urn:www.cenbii.eu:profile:bii05:ver1.0",
    "urn:www.cenbii.eu:profile:bii05:ver2.0",
    "urn:www.cenbii.eu:profile:bii06:ver1.0",
    "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0",
];

pub(super) fn check(doc: &Document, ctx: &mut Context<'_>) {
    if let Some(v) = trimmed(doc.ubl_version_id.as_deref()) {
        if !UBL_VERSIONS.contains(&v) {
            ctx.error(
                "UBLVersionID",
                Text::InvalidUblVersionId,
                &[v, UBL_VERSIONS.join(", ").as_str()],
            );
        }
    }

    match trimmed(doc.profile_id.as_deref()) {
        None if ctx.settings.profile_id_mandatory => {
            ctx.error("ProfileID", Text::MissingProfileId, &[]);
        }
        Some(p) if !KNOWN_PROFILES.contains(&p) => {
            ctx.warn("ProfileID", Text::UnknownProfileId, &[p]);
        }
        _ => {}
    }

    match doc.kind {
        DocumentKind::Invoice => match trimmed(doc.type_code.as_deref()) {
            None => ctx.warn("InvoiceTypeCode", Text::MissingInvoiceTypeCode, &[]),
            Some(code) if !INVOICE_TYPE_CODES.contains(&code) => ctx.error(
                "InvoiceTypeCode",
                Text::InvalidInvoiceTypeCode,
                &[code, INVOICE_TYPE_CODES.join(", ").as_str()],
            ),
            Some(_) => {}
        },
        DocumentKind::CreditNote => {
            if let Some(code) = trimmed(doc.type_code.as_deref()) {
                if !CREDIT_NOTE_TYPE_CODES.contains(&code) {
                    ctx.error(
                        "CreditNoteTypeCode",
                        Text::InvalidCreditNoteTypeCode,
                        &[code, CREDIT_NOTE_TYPE_CODES.join(", ").as_str()],
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorList, Locale, ToEbInterfaceSettings};
    use crate::ebinterface::EbVersion;

    fn run(doc: &Document, settings: &ToEbInterfaceSettings) -> ErrorList {
        let mut errors = ErrorList::new();
        let mut ctx = Context {
            version: EbVersion::V6_0,
            locale: Locale::English,
            settings,
            errors: &mut errors,
        };
        check(doc, &mut ctx);
        errors
    }

    fn invoice(type_code: Option<&str>) -> Document {
        Document {
            ubl_version_id: Some("2.1".into()),
            type_code: type_code.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn valid_header_passes() {
        let errors = run(&invoice(Some("380")), &ToEbInterfaceSettings::default());
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn unsupported_ubl_version() {
        let mut doc = invoice(Some("380"));
        doc.ubl_version_id = Some("1.0".into());
        let errors = run(&doc, &ToEbInterfaceSettings::default());
        assert!(errors.contains_text(Text::InvalidUblVersionId));
        assert!(errors.contains_errors());
    }

    #[test]
    fn invoice_type_codes() {
        let errors = run(&invoice(None), &ToEbInterfaceSettings::default());
        assert_eq!(errors.warning_count(), 1);
        assert!(errors.contains_text(Text::MissingInvoiceTypeCode));

        let errors = run(&invoice(Some("381")), &ToEbInterfaceSettings::default());
        assert!(errors.contains_text(Text::InvalidInvoiceTypeCode));
    }

    #[test]
    fn credit_note_type_codes() {
        let mut doc = invoice(Some("380"));
        doc.kind = DocumentKind::CreditNote;
        let errors = run(&doc, &ToEbInterfaceSettings::default());
        assert!(errors.contains_text(Text::InvalidCreditNoteTypeCode));

        doc.type_code = Some("381".into());
        assert!(run(&doc, &ToEbInterfaceSettings::default()).is_empty());

        doc.type_code = None;
        assert!(run(&doc, &ToEbInterfaceSettings::default()).is_empty());
    }

    #[test]
    fn profile_checks() {
        let settings = ToEbInterfaceSettings::default().with_profile_id_mandatory(true);
        let errors = run(&invoice(Some("380")), &settings);
        assert!(errors.contains_text(Text::MissingProfileId));

        let mut doc = invoice(Some("380"));
        doc.profile_id = Some("urn:example:custom".into());
        let errors = run(&doc, &ToEbInterfaceSettings::default());
        assert!(!errors.contains_errors());
        assert!(errors.contains_text(Text::UnknownProfileId));
    }
}
