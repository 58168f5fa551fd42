//! The country → company → location chain that contextualises a response.
//!
//! Reference data: provisioned out-of-band and only read by the submission
//! and reporting paths.

use serde::{Deserialize, Serialize};

pub type CountryId = i64;
pub type CompanyId = i64;
pub type LocationId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
  pub id:   CountryId,
  /// Unique.
  pub name: String,
  /// Unique short code, e.g. `GT`.
  pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
  pub id:           CompanyId,
  pub name:         String,
  pub country_id:   CountryId,
  /// Joined from the owning country.
  pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub id:           LocationId,
  pub name:         String,
  pub address:      Option<String>,
  pub company_id:   CompanyId,
  /// Joined from the owning company.
  pub company_name: String,
}

/// Check that `location` belongs to `company` and `company` to `country`.
///
/// Returns a human-readable description of the first broken link.
pub fn check_chain(
  country: &Country,
  company: &Company,
  location: &Location,
) -> Result<(), String> {
  if company.country_id != country.id {
    return Err(format!(
      "company {} belongs to country {}, not {}",
      company.id, company.country_id, country.id
    ));
  }
  if location.company_id != company.id {
    return Err(format!(
      "location {} belongs to company {}, not {}",
      location.id, location.company_id, company.id
    ));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn country(id: i64) -> Country {
    Country { id, name: format!("c{id}"), code: format!("C{id}") }
  }

  fn company(id: i64, country_id: i64) -> Company {
    Company { id, name: format!("co{id}"), country_id, country_name: String::new() }
  }

  fn location(id: i64, company_id: i64) -> Location {
    Location {
      id,
      name: format!("l{id}"),
      address: None,
      company_id,
      company_name: String::new(),
    }
  }

  #[test]
  fn consistent_chain_passes() {
    assert!(check_chain(&country(1), &company(2, 1), &location(3, 2)).is_ok());
  }

  #[test]
  fn company_in_other_country_fails() {
    let err = check_chain(&country(1), &company(2, 9), &location(3, 2)).unwrap_err();
    assert!(err.contains("company 2"), "{err}");
  }

  #[test]
  fn location_of_other_company_fails() {
    let err = check_chain(&country(1), &company(2, 1), &location(3, 7)).unwrap_err();
    assert!(err.contains("location 3"), "{err}");
  }
}
