/// A market the jobs API serves, addressed by its lowercase country code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
  pub code: &'static str,
  pub name: &'static str,
}

pub const COUNTRIES: &[Country] = &[
  Country { code: "us", name: "United States" },
  Country { code: "gb", name: "United Kingdom" },
  Country { code: "ca", name: "Canada" },
  Country { code: "au", name: "Australia" },
  Country { code: "de", name: "Germany" },
  Country { code: "fr", name: "France" },
  Country { code: "in", name: "India" },
  Country { code: "nl", name: "Netherlands" },
  Country { code: "nz", name: "New Zealand" },
  Country { code: "sg", name: "Singapore" },
  Country { code: "za", name: "South Africa" },
  Country { code: "br", name: "Brazil" },
  Country { code: "mx", name: "Mexico" },
  Country { code: "it", name: "Italy" },
  Country { code: "es", name: "Spain" },
  Country { code: "pl", name: "Poland" },
  Country { code: "at", name: "Austria" },
  Country { code: "ch", name: "Switzerland" },
  Country { code: "be", name: "Belgium" },
  Country { code: "ru", name: "Russia" },
];

pub fn find(code: &str) -> Option<&'static Country> {
  let code = code.trim();
  COUNTRIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn is_supported(code: &str) -> bool {
  find(code).is_some()
}

/// Display name for a country code, or the upper-cased code when unknown
pub fn country_name(code: &str) -> String {
  match find(code) {
    Some(country) => country.name.to_string(),
    None => code.trim().to_uppercase(),
  }
}
