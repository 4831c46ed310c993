#![no_main]

use libfuzzer_sys::fuzz_target;
use ubl_ebinterface::ebinterface;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(invoice) = ebinterface::from_xml(s) {
            if let Ok(xml2) = ebinterface::to_xml(&invoice) {
                let _ = ebinterface::from_xml(&xml2);
            }
        }
    }
});
