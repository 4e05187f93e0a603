//! Address-verification mechanism resolution.
//!
//! The applicant proves their address either by phone (vendor match plus
//! one-time code) or by a code mailed through GPO.

use crate::attributes::SessionAttributes;
use idv_types::AddressMechanism;

/// Derives address-step state from session attributes.
pub struct AddressResolver;

impl AddressResolver {
    /// Vendor and user both confirmed the phone.
    pub fn phone_confirmed(&self, attrs: &SessionAttributes) -> bool {
        attrs.phone_confirmation.is_confirmed()
    }

    /// A mechanism is settled: the vendor confirmed the phone, or GPO was chosen.
    pub fn address_mechanism_chosen(&self, attrs: &SessionAttributes) -> bool {
        attrs.phone_confirmation.vendor() == Some(true)
            || mechanism(attrs) == Some(AddressMechanism::Gpo)
    }

    /// GPO was chosen, or the phone is confirmed on both sides.
    pub fn address_step_complete(&self, attrs: &SessionAttributes) -> bool {
        mechanism(attrs) == Some(AddressMechanism::Gpo) || self.phone_confirmed(attrs)
    }

    /// A mailed code is still required before the profile can activate.
    pub fn gpo_verification_needed(&self, attrs: &SessionAttributes) -> bool {
        mechanism(attrs) == Some(AddressMechanism::Gpo) || !self.phone_confirmed(attrs)
    }
}

fn mechanism(attrs: &SessionAttributes) -> Option<AddressMechanism> {
    attrs.address_verification_mechanism
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phone::PhoneConfirmation;

    fn attrs(mech: Option<AddressMechanism>, phone: PhoneConfirmation) -> SessionAttributes {
        let mut a = SessionAttributes::default();
        a.address_verification_mechanism = mech;
        a.phone_confirmation = phone;
        a
    }

    #[test]
    fn gpo_chosen_completes_address_step() {
        let a = attrs(Some(AddressMechanism::Gpo), PhoneConfirmation::NotStarted);
        assert!(AddressResolver.address_mechanism_chosen(&a));
        assert!(AddressResolver.address_step_complete(&a));
        assert!(AddressResolver.gpo_verification_needed(&a));
    }

    #[test]
    fn vendor_confirmed_phone_chooses_mechanism_but_not_complete() {
        let a = attrs(Some(AddressMechanism::Phone), PhoneConfirmation::VendorConfirmed);
        assert!(AddressResolver.address_mechanism_chosen(&a));
        assert!(!AddressResolver.address_step_complete(&a));
        assert!(AddressResolver.gpo_verification_needed(&a));
    }

    #[test]
    fn fully_confirmed_phone_needs_no_gpo() {
        let a = attrs(Some(AddressMechanism::Phone), PhoneConfirmation::UserConfirmed);
        assert!(AddressResolver.phone_confirmed(&a));
        assert!(AddressResolver.address_step_complete(&a));
        assert!(!AddressResolver.gpo_verification_needed(&a));
    }

    #[test]
    fn vendor_confirmation_alone_chooses_mechanism() {
        let a = attrs(None, PhoneConfirmation::VendorConfirmed);
        assert!(AddressResolver.address_mechanism_chosen(&a));
        assert!(!AddressResolver.address_step_complete(&a));
    }

    #[test]
    fn nothing_chosen() {
        let a = attrs(Some(AddressMechanism::Phone), PhoneConfirmation::Rejected);
        assert!(!AddressResolver.address_mechanism_chosen(&a));
        assert!(!AddressResolver.address_step_complete(&a));
        assert!(AddressResolver.gpo_verification_needed(&a));
    }

    #[test]
    fn gpo_with_confirmed_phone_still_needs_letter() {
        let a = attrs(Some(AddressMechanism::Gpo), PhoneConfirmation::UserConfirmed);
        assert!(AddressResolver.gpo_verification_needed(&a));
    }
}
