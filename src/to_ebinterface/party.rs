//! Biller, invoice recipient, ordering party and address mapping.

use super::{Context, UNKNOWN_VAT_ID, trimmed};
use crate::core::Text;
use crate::core::codes::is_iso_country;
use crate::ebinterface::{
    Address, AddressIdentifier, AddressIdentifierType, Biller, Country, InvoiceRecipient,
    OrderReference, OrderingParty,
};
use crate::ubl::{self, Document, Party, SchemedId};

const SUPPLIER: &str = "AccountingSupplierParty/Party";
const CUSTOMER: &str = "AccountingCustomerParty/Party";
const BUYER: &str = "BuyerCustomerParty/Party";

pub(super) fn convert_biller(doc: &Document, ctx: &mut Context<'_>) -> Option<Biller> {
    let Some((supplier, party)) = doc
        .supplier
        .as_ref()
        .and_then(|s| s.party.as_ref().map(|p| (s, p)))
    else {
        ctx.error("AccountingSupplierParty", Text::MissingSupplierParty, &[]);
        return None;
    };

    let vat_id = vat_id(party).unwrap_or_else(|| {
        ctx.warn(
            format!("{SUPPLIER}/PartyTaxScheme/CompanyID"),
            Text::MissingBillerVatId,
            &[UNKNOWN_VAT_ID],
        );
        UNKNOWN_VAT_ID.to_string()
    });

    let invoice_recipients_biller_id =
        trimmed(supplier.assigned_account_id.as_deref()).map(str::to_string);
    if invoice_recipients_biller_id.is_none() && ctx.settings.invoice_recipients_biller_id_mandatory
    {
        ctx.error(
            "AccountingSupplierParty/CustomerAssignedAccountID",
            Text::MissingInvoiceRecipientsBillerId,
            &[],
        );
    }

    let mut address = convert_party_address(party, SUPPLIER, true, ctx);
    if address.email.is_none() && ctx.settings.enforce_supplier_email_address {
        let field = format!("{SUPPLIER}/Contact/ElectronicMail");
        match ctx.settings.enforced_supplier_email_address.clone() {
            Some(fallback) => {
                ctx.warn(field, Text::EnforcedSupplierEmail, &[fallback.as_str()]);
                address.email = Some(fallback);
            }
            None => ctx.error(field, Text::MissingSupplierEmail, &[]),
        }
    }

    Some(Biller {
        vat_id,
        invoice_recipients_biller_id,
        address,
    })
}

pub(super) fn convert_invoice_recipient(
    doc: &Document,
    ctx: &mut Context<'_>,
) -> Option<InvoiceRecipient> {
    let Some((customer, party)) = doc
        .customer
        .as_ref()
        .and_then(|c| c.party.as_ref().map(|p| (c, p)))
    else {
        ctx.error("AccountingCustomerParty", Text::MissingCustomerParty, &[]);
        return None;
    };

    let vat_id = vat_id(party).unwrap_or_else(|| {
        ctx.warn(
            format!("{CUSTOMER}/PartyTaxScheme/CompanyID"),
            Text::MissingRecipientVatId,
            &[UNKNOWN_VAT_ID],
        );
        UNKNOWN_VAT_ID.to_string()
    });

    let order_reference = convert_order_reference(doc, ctx);
    let address = convert_party_address(party, CUSTOMER, true, ctx);

    Some(InvoiceRecipient {
        vat_id,
        billers_invoice_recipient_id: trimmed(customer.assigned_account_id.as_deref())
            .map(str::to_string),
        order_reference,
        address,
    })
}

fn convert_order_reference(doc: &Document, ctx: &mut Context<'_>) -> Option<OrderReference> {
    let or = doc.order_reference.as_ref();
    let Some(id) = trimmed(or.and_then(|o| o.id.as_deref())) else {
        if ctx.settings.order_reference_id_mandatory {
            ctx.error("OrderReference/ID", Text::MissingOrderReferenceId, &[]);
        }
        return None;
    };
    if let Some(max) = ctx.settings.order_reference_id_max_length {
        if id.chars().count() > max {
            ctx.error(
                "OrderReference/ID",
                Text::OrderReferenceIdTooLong,
                &[id, max.to_string().as_str()],
            );
        }
    }
    Some(OrderReference {
        order_id: id.to_string(),
        reference_date: or.and_then(|o| o.issue_date),
    })
}

pub(super) fn convert_ordering_party(
    doc: &Document,
    ctx: &mut Context<'_>,
) -> Option<OrderingParty> {
    let party = doc.buyer_customer.as_ref()?;
    Some(OrderingParty {
        vat_id: vat_id(party).unwrap_or_else(|| UNKNOWN_VAT_ID.to_string()),
        billers_ordering_party_id: None,
        address: convert_party_address(party, BUYER, true, ctx),
    })
}

/// CompanyID of the VAT tax scheme, else of any tax scheme.
fn vat_id(party: &Party) -> Option<String> {
    let is_vat = |id: &Option<SchemedId>| {
        id.as_ref()
            .is_some_and(|s| s.value.trim().eq_ignore_ascii_case("VAT"))
    };
    party
        .tax_schemes
        .iter()
        .filter(|ts| is_vat(&ts.tax_scheme_id))
        .chain(party.tax_schemes.iter())
        .find_map(|ts| trimmed(ts.company_id.as_deref()))
        .map(str::to_string)
}

/// Map a full party (name, postal address, contact, identifiers).
///
/// With `validate`, missing name and address parts are ERRORs.
pub(super) fn convert_party_address(
    party: &Party,
    field: &str,
    validate: bool,
    ctx: &mut Context<'_>,
) -> Address {
    let mut address = map_address(
        party.display_name(),
        party.postal_address.as_ref(),
        field,
        validate,
        ctx,
    );

    address.identifiers = identifiers(party);
    address.contact = contact_name(party);
    if let Some(c) = &party.contact {
        address.phone = trimmed(c.telephone.as_deref()).map(str::to_string);
        address.email = trimmed(c.email.as_deref()).map(str::to_string);
    }
    address
}

/// Map a name plus UBL postal address.
pub(super) fn map_address(
    name: Option<&str>,
    postal: Option<&ubl::Address>,
    field: &str,
    validate: bool,
    ctx: &mut Context<'_>,
) -> Address {
    let name = trimmed(name).map(str::to_string);
    if name.is_none() && validate {
        ctx.error(format!("{field}/PartyName/Name"), Text::MissingPartyName, &[]);
    }
    let mut address = Address {
        name: name.unwrap_or_default(),
        ..Default::default()
    };

    let Some(postal) = postal else {
        if validate {
            ctx.error(format!("{field}/PostalAddress"), Text::MissingAddress, &[]);
        }
        return address;
    };
    let addr_field = format!("{field}/PostalAddress");

    address.street = street(postal);
    if address.street.is_none() && validate {
        ctx.error(format!("{addr_field}/StreetName"), Text::MissingAddressStreet, &[]);
    }

    match trimmed(postal.city_name.as_deref()) {
        Some(town) => address.town = town.to_string(),
        None if validate => {
            ctx.error(format!("{addr_field}/CityName"), Text::MissingAddressTown, &[])
        }
        None => {}
    }

    match trimmed(postal.postal_zone.as_deref()) {
        Some(zip) => address.zip = zip.to_string(),
        None if validate => {
            ctx.error(format!("{addr_field}/PostalZone"), Text::MissingAddressZip, &[])
        }
        None => {}
    }

    address.country = country(postal, &addr_field, ctx);
    if address.country.is_none() && validate {
        ctx.error(format!("{addr_field}/Country"), Text::MissingAddressCountry, &[]);
    }
    address
}

/// StreetName and BuildingNumber separated by a space.
fn street(postal: &ubl::Address) -> Option<String> {
    let parts: Vec<&str> = [postal.street_name.as_deref(), postal.building_number.as_deref()]
        .into_iter()
        .filter_map(trimmed)
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn country(postal: &ubl::Address, field: &str, ctx: &mut Context<'_>) -> Option<Country> {
    let c = postal.country.as_ref()?;
    let mut code = trimmed(c.code.as_deref()).map(str::to_string);
    let name = trimmed(c.name.as_deref()).map(str::to_string);

    if let Some(cc) = code.as_deref() {
        if ctx.version.restricts_country_codes() && !is_iso_country(cc) {
            ctx.warn(
                format!("{field}/Country/IdentificationCode"),
                Text::UnknownCountryCode,
                &[cc],
            );
            code = None;
        }
    }

    let text = name.or_else(|| trimmed(c.code.as_deref()).map(str::to_string))?;
    Some(Country { code, name: text })
}

fn contact_name(party: &Party) -> Option<String> {
    let from_person = party.person.as_ref().and_then(|p| {
        let parts: Vec<&str> = [
            p.first_name.as_deref(),
            p.middle_name.as_deref(),
            p.family_name.as_deref(),
        ]
        .into_iter()
        .filter_map(trimmed)
        .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    });
    from_person.or_else(|| {
        party
            .contact
            .as_ref()
            .and_then(|c| trimmed(c.name.as_deref()))
            .map(str::to_string)
    })
}

fn identifier_type(scheme: Option<&str>) -> Option<AddressIdentifierType> {
    match scheme.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("GLN") || s == "0088" => Some(AddressIdentifierType::Gln),
        Some(s) if s.eq_ignore_ascii_case("DUNS") || s == "0060" => {
            Some(AddressIdentifierType::Duns)
        }
        _ => None,
    }
}

/// GLN and DUNS numbers from EndpointID and PartyIdentification.
fn identifiers(party: &Party) -> Vec<AddressIdentifier> {
    let mut out: Vec<AddressIdentifier> = Vec::new();
    for id in party.endpoint_id.iter().chain(party.identifications.iter()) {
        let Some(kind) = identifier_type(id.scheme_id.as_deref()) else {
            continue;
        };
        let value = id.value.trim();
        if value.is_empty() || out.iter().any(|a| a.kind == kind && a.value == value) {
            continue;
        }
        out.push(AddressIdentifier {
            kind,
            value: value.to_string(),
        });
    }
    out
}
