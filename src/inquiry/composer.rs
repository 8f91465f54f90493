//! Inquiry message composition.
//!
//! Formats the WhatsApp text a visitor sends about a listing: detail link,
//! greeting, property name, location, and price. Pure formatting over a
//! [`PropertyDetails`]; fetching the listing is the caller's job.

use crate::listings::PropertyDetails;

/// Compose the inquiry text for a listing.
///
/// `site_base` is the public site root; the first line is the property
/// detail link so the receiving admin can open the listing directly.
/// A listing without a location renders an empty location segment.
pub fn compose_inquiry(site_base: &str, details: &PropertyDetails) -> String {
    let detail_url = format!("{}/details-property/{}", site_base.trim_end_matches('/'), details.id);
    let location = details.location.as_deref().unwrap_or("");
    let price = format_price(details.price);

    format!(
        "{detail_url}\n\
         🌟 Halo Admin Opendoorz\n\
         \n\
         Saya tertarik dengan properti *{title}* yang tersedia di website.\n\
         \n\
         🏡 *Nama Properti*: {title}\n\
         📍 *Lokasi*: {address}, {location}\n\
         💰 *Harga*: Rp. {price}\n\
         \n\
         Saya ingin mengetahui lebih lanjut tentang proses pembelian dan detail lainnya.\n\
         Bisa tolong dibantu untuk informasinya? Terima kasih! 😊",
        title = details.title,
        address = details.address,
    )
}

/// Format a rupiah amount with dot thousands separators (`1234567` →
/// `1.234.567`).
pub fn format_price(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    let first_group = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    out.push_str(&digits[..first_group]);
    for chunk in digits[first_group..].as_bytes().chunks(3) {
        out.push('.');
        // chunks of an ASCII digit string stay valid UTF-8
        out.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    out
}
