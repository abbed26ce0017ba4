//! Overdue-alert text and phone number normalization.

use crate::trip::GeoPoint;

/// Country calling code used when a number has none.
pub const DEFAULT_COUNTRY_CODE: &str = "+966";

/// Radius around the destination mentioned in the alert, in kilometres.
pub const DESTINATION_RADIUS_KM: u32 = 10;

const NOT_AVAILABLE: &str = "not available";

/// Normalize a phone number to international form.
///
/// Spaces, dashes and parentheses are removed. A leading `0` (national
/// trunk prefix) is replaced with `country_code`; any other number without a
/// leading `+` gets `country_code` prepended.
///
/// ```
/// use trip_clock::alert::format_phone_number;
///
/// assert_eq!(format_phone_number("050 123-4567", "+966"), "+966501234567");
/// assert_eq!(format_phone_number("+44 20 7946 0958", "+966"), "+442079460958");
/// ```
pub fn format_phone_number(raw: &str, country_code: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if let Some(national) = cleaned.strip_prefix('0') {
        format!("{country_code}{national}")
    } else if cleaned.starts_with('+') {
        cleaned
    } else {
        format!("{country_code}{cleaned}")
    }
}

/// Compose the alert sent to contacts when a trip passes its deadline.
pub fn compose_alert_message(last_location: Option<GeoPoint>, destination: Option<GeoPoint>) -> String {
    format!(
        "Alert message\n\
         This is an automated message from the trip safety service.\n\
         \n\
         The user's return time has passed but their return has not been confirmed. \
         Please contact the user to make sure they are safe and, if needed, \
         escalate to the relevant authorities.\n\
         \n\
         Last saved location of the user:\n\
         {}\n\
         \n\
         Destination set by the user (circular area with a {DESTINATION_RADIUS_KM} km radius):\n\
         {}",
        describe(last_location),
        describe(destination),
    )
}

fn describe(point: Option<GeoPoint>) -> String {
    match point {
        Some(p) => format!("{}, {}", p.lat, p.lng),
        None => NOT_AVAILABLE.to_string(),
    }
}
