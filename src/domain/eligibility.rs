use super::courier::Courier;
use super::motorcycle::Motorcycle;
use crate::error::EligibilityError;

/// Checks that `courier` may rent `motorcycle`.
///
/// Checks run in a fixed order and stop at the first failure: motorcycle
/// existence, motorcycle availability, courier existence, courier enabled,
/// and finally a license category covering motorcycles.
pub fn can_open(
    courier: Option<&Courier>,
    motorcycle: Option<&Motorcycle>,
) -> Result<(), EligibilityError> {
    let motorcycle = motorcycle.ok_or(EligibilityError::MotorcycleNotFound)?;
    if !motorcycle.available {
        return Err(EligibilityError::MotorcycleUnavailable);
    }

    let courier = courier.ok_or(EligibilityError::CourierNotFound)?;
    if !courier.enabled {
        return Err(EligibilityError::CourierNotEnabled);
    }
    if !courier.license_category.permits_motorcycle() {
        return Err(EligibilityError::CourierNotLicensedForCategory);
    }

    Ok(())
}
