#![no_main]

use libfuzzer_sys::fuzz_target;
use ubl_ebinterface::core::{ErrorList, Locale, ToEbInterfaceSettings};
use ubl_ebinterface::ebinterface::{self, EbVersion};
use ubl_ebinterface::{ToEbInterfaceConverter, ToUblConverter};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = ubl_ebinterface::ubl::from_ubl_xml(s) else {
        return;
    };
    // The full pipeline must not panic for any version.
    for version in EbVersion::ALL {
        let converter =
            ToEbInterfaceConverter::new(version, Locale::English, ToEbInterfaceSettings::default());
        let mut errors = ErrorList::new();
        if let Ok(Some(invoice)) = converter.convert(&doc, &mut errors) {
            let _ = ebinterface::to_xml(&invoice);
            let _ = ToUblConverter::default().convert(&invoice, &mut ErrorList::new());
        }
    }
});
