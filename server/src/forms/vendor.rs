use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{invalid_choice, known_codes, normalize_code, require, FieldErrors};
use crate::models::{GeoState, VendorProfile, VendorProfileDraft};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct VendorProfileForm {
    #[serde(default)]
    #[validate(length(max = 255, message = "Ensure this value has at most 255 characters."))]
    pub company_name: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub base_city: String,
    #[serde(default)]
    pub base_state: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "Ensure this value has at most 10 characters."))]
    pub base_zip: String,
    #[serde(default)]
    pub service_states: Vec<String>,
}

impl VendorProfileForm {
    /// Pre-fills the form from a saved profile.
    pub fn from_profile(profile: &VendorProfile) -> Self {
        Self {
            company_name: profile.company_name.clone(),
            base_city: profile.base_city.clone(),
            base_state: profile.base_state.clone(),
            base_zip: profile.base_zip.clone(),
            service_states: profile.service_states.clone(),
        }
    }

    pub fn clean(&self, states: &[GeoState]) -> Result<VendorProfileDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(found) = self.validate() {
            errors.absorb(found);
        }
        let known = known_codes(states);

        let company_name = self.company_name.trim();
        require(&mut errors, "company_name", company_name);

        let base_state = normalize_code(&self.base_state);
        if !base_state.is_empty() && !known.contains(base_state.as_str()) {
            errors.add("base_state", invalid_choice(&base_state));
        }

        let mut service_states = BTreeSet::new();
        for raw in &self.service_states {
            let code = normalize_code(raw);
            if known.contains(code.as_str()) {
                service_states.insert(code);
            } else {
                errors.add("service_states", invalid_choice(raw.trim()));
            }
        }

        errors.into_result(VendorProfileDraft {
            company_name: company_name.to_string(),
            base_city: self.base_city.trim().to_string(),
            base_state,
            base_zip: self.base_zip.trim().to_string(),
            service_states: service_states.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::fixtures::states;
    use crate::forms::REQUIRED;

    #[test]
    fn normalizes_and_deduplicates_service_states() {
        let form = VendorProfileForm {
            company_name: " Loud & Clear ".to_string(),
            base_state: "ca".to_string(),
            service_states: vec!["ny".to_string(), "CA".to_string(), " ny ".to_string()],
            ..VendorProfileForm::default()
        };

        let draft = form.clean(&states()).expect("valid");
        assert_eq!(draft.company_name, "Loud & Clear");
        assert_eq!(draft.base_state, "CA");
        assert_eq!(draft.service_states, vec!["CA".to_string(), "NY".to_string()]);
    }

    #[test]
    fn company_name_is_required_and_states_must_exist() {
        let form = VendorProfileForm {
            base_state: "QQ".to_string(),
            service_states: vec!["ZZ".to_string()],
            ..VendorProfileForm::default()
        };

        let errors = form.clean(&states()).unwrap_err();
        assert_eq!(errors.get("company_name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(
            errors.get("service_states"),
            Some(&["Select a valid choice. ZZ is not one of the available choices.".to_string()][..])
        );
        assert!(errors.get("base_state").is_some());
    }

    #[test]
    fn no_service_states_is_allowed() {
        let form = VendorProfileForm {
            company_name: "Quiet Co".to_string(),
            ..VendorProfileForm::default()
        };
        assert!(form.clean(&states()).unwrap().service_states.is_empty());
    }

    #[test]
    fn overlong_zip_is_rejected() {
        let form = VendorProfileForm {
            company_name: "Quiet Co".to_string(),
            base_zip: "12345-67890".to_string(),
            ..VendorProfileForm::default()
        };
        assert!(form.clean(&states()).unwrap_err().get("base_zip").is_some());
    }
}
