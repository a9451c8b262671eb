// Booking quote calculation: nights x nightly rate plus the room's fee schedule
// All arithmetic stays in integer minor units; percentages are basis points

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{BasisPoints, BookingError, DateRange, MinorUnits, Room, ServiceFee};

const FULL_BASIS: i128 = 10_000;

// Itemized stay price. Derived on demand, never persisted; deterministic for
// the same (range, room) inputs. The security deposit is a hold and is
// reported separately, never folded into the charged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: u32,
    pub currency: String,
    pub subtotal_minor: MinorUnits,
    pub cleaning_fee_minor: MinorUnits,
    pub service_fee_minor: MinorUnits,
    pub tax_minor: MinorUnits,
    pub total_minor: MinorUnits,
    pub security_deposit_minor: Option<MinorUnits>,
}

// Compute the chargeable total for a stay. The caller is expected to have
// validated the range against a resolved AvailabilityMap first; pricing does
// not re-resolve availability.
pub fn quote(range: &DateRange, room: &Room) -> Result<Quote, BookingError> {
    validate_rate(room)?;

    // DateRange construction already rejects nights <= 0
    let nights = range.nights();
    let subtotal = nights as i128 * room.nightly_rate_minor as i128;

    let cleaning = room.fees.cleaning_fee_minor.unwrap_or(0) as i128;
    let service = match room.fees.service_fee {
        None => 0,
        Some(ServiceFee::Flat(amount)) => amount as i128,
        Some(ServiceFee::PercentOfSubtotal(rate_bp)) => percent_of(subtotal, rate_bp),
    };

    // The tax basis is the subtotal, widened to the charged fees only when the
    // room's jurisdiction declares them taxable. The deposit is never taxed.
    let taxable = if room.fees.tax_on_fees {
        subtotal + cleaning + service
    } else {
        subtotal
    };
    let tax = match room.fees.tax_rate_bp {
        None => 0,
        Some(rate_bp) => percent_of(taxable, rate_bp),
    };
    let total = subtotal + cleaning + service + tax;

    Ok(Quote {
        nights,
        currency: room.currency.clone(),
        subtotal_minor: to_minor(subtotal)?,
        cleaning_fee_minor: to_minor(cleaning)?,
        service_fee_minor: to_minor(service)?,
        tax_minor: to_minor(tax)?,
        total_minor: to_minor(total)?,
        security_deposit_minor: room.fees.security_deposit_minor,
    })
}

fn validate_rate(room: &Room) -> Result<(), BookingError> {
    if room.nightly_rate_minor <= 0 {
        return Err(BookingError::InvalidRoomRate(format!(
            "nightly rate must be positive, got {}",
            room.nightly_rate_minor
        )));
    }

    let fees = &room.fees;
    if fees.cleaning_fee_minor.is_some_and(|fee| fee < 0) {
        return Err(BookingError::InvalidRoomRate(
            "cleaning fee must not be negative".into(),
        ));
    }
    if fees.security_deposit_minor.is_some_and(|deposit| deposit < 0) {
        return Err(BookingError::InvalidRoomRate(
            "security deposit must not be negative".into(),
        ));
    }
    match fees.service_fee {
        Some(ServiceFee::Flat(amount)) if amount < 0 => {
            return Err(BookingError::InvalidRoomRate(
                "flat service fee must not be negative".into(),
            ));
        }
        Some(ServiceFee::PercentOfSubtotal(rate_bp)) if rate_bp as i128 > FULL_BASIS => {
            return Err(BookingError::InvalidRoomRate(format!(
                "service fee percentage {}bp exceeds 100%",
                rate_bp
            )));
        }
        _ => {}
    }
    if fees.tax_rate_bp.is_some_and(|rate_bp| rate_bp as i128 > FULL_BASIS) {
        return Err(BookingError::InvalidRoomRate(format!(
            "tax rate {}bp exceeds 100%",
            fees.tax_rate_bp.unwrap_or(0)
        )));
    }

    Ok(())
}

// Basis-point percentage of an amount, rounded to the minor unit half-to-even
fn percent_of(amount: i128, rate_bp: BasisPoints) -> i128 {
    round_half_even(amount * rate_bp as i128, FULL_BASIS)
}

// Round numerator/denominator to the nearest integer, ties to even.
// Amounts are validated non-negative before reaching here.
fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    debug_assert!(numerator >= 0 && denominator > 0);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    match (remainder * 2).cmp(&denominator) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

fn to_minor(amount: i128) -> Result<MinorUnits, BookingError> {
    MinorUnits::try_from(amount).map_err(|_| {
        BookingError::InvalidRoomRate("amount exceeds the minor-unit representation".into())
    })
}
