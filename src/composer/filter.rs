//! Filter state and its translation into list-endpoint query parameters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::composer::pagination::PageRequest;
use crate::error::{AppError, AppResult};

/// Query parameter carrying the exact-date constraint.
pub const DATE_PARAM: &str = "date_joined";
pub const SEARCH_PARAM: &str = "search";
pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// A named boolean filter that can be switched on independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetTag {
    Admin,
    Staff,
    Verified,
    Unverified,
    Blocked,
    Active,
}

impl FacetTag {
    pub const ALL: [FacetTag; 6] = [
        FacetTag::Admin,
        FacetTag::Staff,
        FacetTag::Verified,
        FacetTag::Unverified,
        FacetTag::Blocked,
        FacetTag::Active,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetTag::Admin => "admin",
            FacetTag::Staff => "staff",
            FacetTag::Verified => "verified",
            FacetTag::Unverified => "unverified",
            FacetTag::Blocked => "blocked",
            FacetTag::Active => "active",
        }
    }

    /// The `(key, value)` query pair this facet contributes.
    pub fn param(&self) -> (&'static str, &'static str) {
        match self {
            FacetTag::Admin => ("is_admin_account", "true"),
            FacetTag::Staff => ("is_staff", "true"),
            FacetTag::Verified => ("is_verified", "true"),
            FacetTag::Unverified => ("is_verified", "false"),
            FacetTag::Blocked => ("is_blocked", "true"),
            FacetTag::Active => ("is_blocked", "false"),
        }
    }

    /// Facet sharing the same query key with the opposite value.
    pub fn counterpart(&self) -> Option<FacetTag> {
        match self {
            FacetTag::Verified => Some(FacetTag::Unverified),
            FacetTag::Unverified => Some(FacetTag::Verified),
            FacetTag::Blocked => Some(FacetTag::Active),
            FacetTag::Active => Some(FacetTag::Blocked),
            FacetTag::Admin | FacetTag::Staff => None,
        }
    }

    /// Role facets are only offered to administrators.
    pub fn requires_admin(&self) -> bool {
        matches!(self, FacetTag::Admin | FacetTag::Staff)
    }
}

impl fmt::Display for FacetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetTag {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FacetTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| {
                AppError::validation(
                    "facet",
                    format!(
                        "unknown facet '{}', expected one of: admin, staff, verified, unverified, blocked, active",
                        s
                    ),
                )
            })
    }
}

/// Mode selector used by [`DateConstraint::from_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    None,
    Today,
    Custom,
}

impl FromStr for DateMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(DateMode::None),
            "today" => Ok(DateMode::Today),
            "custom" => Ok(DateMode::Custom),
            other => Err(AppError::validation(
                "date_mode",
                format!("unknown date mode '{}', expected none, today or custom", other),
            )),
        }
    }
}

/// Exact-date constraint on `date_joined`.
///
/// The calendar date only exists in the `Custom` variant, so a value can never
/// be stored without the custom mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateConstraint {
    #[default]
    None,
    /// Resolved to the local calendar date when parameters are built
    Today,
    Custom(Date),
}

impl DateConstraint {
    /// Build a constraint from a mode and an optional `YYYY-MM-DD` value.
    ///
    /// `None` and `Today` ignore the value; `Custom` requires a well-formed one.
    pub fn from_mode(mode: DateMode, value: Option<&str>) -> AppResult<Self> {
        match mode {
            DateMode::None => Ok(DateConstraint::None),
            DateMode::Today => Ok(DateConstraint::Today),
            DateMode::Custom => {
                let raw = value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| {
                        AppError::validation(DATE_PARAM, "custom date mode requires a YYYY-MM-DD value")
                    })?;
                parse_calendar_date(raw).map(DateConstraint::Custom)
            }
        }
    }

    pub fn mode(&self) -> DateMode {
        match self {
            DateConstraint::None => DateMode::None,
            DateConstraint::Today => DateMode::Today,
            DateConstraint::Custom(_) => DateMode::Custom,
        }
    }

    /// The date that goes on the wire, if any.
    pub fn resolve(&self, today: Date) -> Option<Date> {
        match self {
            DateConstraint::None => None,
            DateConstraint::Today => Some(today),
            DateConstraint::Custom(date) => Some(*date),
        }
    }
}

/// Shorthand accepted on the command line: `none`, `today`, or a date.
impl FromStr for DateConstraint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(DateConstraint::None),
            "today" => Ok(DateConstraint::Today),
            _ => DateConstraint::from_mode(DateMode::Custom, Some(s)),
        }
    }
}

fn parse_calendar_date(raw: &str) -> AppResult<Date> {
    // jiff also accepts compact forms like 20240615; the endpoint does not.
    let well_shaped = raw.len() == 10
        && raw
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !well_shaped {
        return Err(AppError::validation(
            DATE_PARAM,
            format!("'{}' is not a YYYY-MM-DD date", raw),
        ));
    }

    raw.parse::<Date>()
        .map_err(|e| AppError::validation(DATE_PARAM, format!("'{}' is not a valid date: {}", raw, e)))
}

/// Everything the user has asked the list to be narrowed by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Raw text as typed; trimmed when emitted
    pub search: String,
    pub facets: BTreeSet<FacetTag>,
    pub date: DateConstraint,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_facet(mut self, tag: FacetTag) -> Self {
        self.activate(tag);
        self
    }

    pub fn with_date(mut self, date: DateConstraint) -> Self {
        self.date = date;
        self
    }

    pub fn trimmed_search(&self) -> &str {
        self.search.trim()
    }

    pub fn is_active(&self, tag: FacetTag) -> bool {
        self.facets.contains(&tag)
    }

    /// Flip `tag`; returns whether it is active afterwards.
    pub fn toggle(&mut self, tag: FacetTag) -> bool {
        if self.facets.remove(&tag) {
            false
        } else {
            self.activate(tag);
            true
        }
    }

    fn activate(&mut self, tag: FacetTag) {
        if let Some(counterpart) = tag.counterpart() {
            self.facets.remove(&counterpart);
        }
        self.facets.insert(tag);
    }

    /// No search text, no facet and no date constraint.
    pub fn is_unfiltered(&self) -> bool {
        self.trimmed_search().is_empty() && self.facets.is_empty() && self.date == DateConstraint::None
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Map the filters plus the requested page onto query parameters.
    ///
    /// Inactive constraints are omitted entirely; the backend treats the mere
    /// presence of a key as a filter.
    pub fn to_params(&self, page: &PageRequest, today: Date) -> RequestParams {
        let mut params = RequestParams::default();
        params.insert(PAGE_PARAM, page.page.to_string());
        params.insert(PAGE_SIZE_PARAM, page.page_size.to_string());

        let search = self.trimmed_search();
        if !search.is_empty() {
            params.insert(SEARCH_PARAM, search);
        }

        for tag in &self.facets {
            let (key, value) = tag.param();
            params.insert(key, value);
        }

        if let Some(date) = self.date.resolve(today) {
            params.insert(DATE_PARAM, date.to_string());
        }

        params
    }
}

/// Ordered query parameters for one list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    inner: BTreeMap<String, String>,
}

impl RequestParams {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for RequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str("&")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use proptest::prelude::*;

    fn page_one() -> PageRequest {
        PageRequest::new(1, 10)
    }

    fn today() -> Date {
        date(2024, 6, 15)
    }

    #[test]
    fn test_unfiltered_state_only_sends_paging() {
        let params = FilterState::new().to_params(&page_one(), today());
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("page"), Some("1"));
        assert_eq!(params.get("page_size"), Some("10"));
    }

    #[test]
    fn test_verified_and_blocked_in_one_request() {
        let state = FilterState::new()
            .with_facet(FacetTag::Verified)
            .with_facet(FacetTag::Blocked);
        let params = state.to_params(&page_one(), today());

        assert_eq!(params.get("is_verified"), Some("true"));
        assert_eq!(params.get("is_blocked"), Some("true"));
    }

    #[test]
    fn test_search_is_trimmed_and_blank_is_omitted() {
        let params = FilterState::new()
            .with_search("  ravi ")
            .to_params(&page_one(), today());
        assert_eq!(params.get("search"), Some("ravi"));

        let params = FilterState::new()
            .with_search("   ")
            .to_params(&page_one(), today());
        assert!(!params.contains_key("search"));
    }

    #[test]
    fn test_today_resolves_at_build_time() {
        let params = FilterState::new()
            .with_date(DateConstraint::Today)
            .to_params(&page_one(), today());
        assert_eq!(params.get("date_joined"), Some("2024-06-15"));
    }

    #[test]
    fn test_custom_date_is_sent_verbatim() {
        let constraint = DateConstraint::from_mode(DateMode::Custom, Some("2023-01-09")).unwrap();
        let params = FilterState::new()
            .with_date(constraint)
            .to_params(&page_one(), today());
        assert_eq!(params.get("date_joined"), Some("2023-01-09"));
    }

    #[test]
    fn test_custom_mode_requires_value() {
        assert!(DateConstraint::from_mode(DateMode::Custom, None).is_err());
        assert!(DateConstraint::from_mode(DateMode::Custom, Some(" ")).is_err());
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        for raw in ["2024-13-01", "2024-02-30", "15-06-2024", "20240615", "yesterday"] {
            let result = DateConstraint::from_mode(DateMode::Custom, Some(raw));
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_none_mode_discards_value() {
        let constraint = DateConstraint::from_mode(DateMode::None, Some("2024-01-01")).unwrap();
        assert_eq!(constraint, DateConstraint::None);
    }

    #[test]
    fn test_toggle_removes_counterpart() {
        let mut state = FilterState::new();
        assert!(state.toggle(FacetTag::Verified));
        assert!(state.toggle(FacetTag::Unverified));
        assert!(!state.is_active(FacetTag::Verified));

        let params = state.to_params(&page_one(), today());
        assert_eq!(params.get("is_verified"), Some("false"));

        assert!(!state.toggle(FacetTag::Unverified));
        assert!(state.facets.is_empty());
    }

    #[test]
    fn test_facet_parsing() {
        assert_eq!("Blocked".parse::<FacetTag>().unwrap(), FacetTag::Blocked);
        assert!("moderator".parse::<FacetTag>().is_err());
    }

    #[test]
    fn test_params_display_is_ordered() {
        let params = FilterState::new()
            .with_facet(FacetTag::Admin)
            .to_params(&page_one(), today());
        assert_eq!(params.to_string(), "is_admin_account=true&page=1&page_size=10");
    }

    fn arb_facets() -> impl Strategy<Value = Vec<FacetTag>> {
        prop::collection::vec(prop::sample::select(FacetTag::ALL.to_vec()), 0..8)
    }

    proptest! {
        #[test]
        fn property_inactive_facets_never_emitted(toggles in arb_facets(), search in "[ a-z]{0,6}") {
            let mut state = FilterState::new().with_search(search);
            for tag in toggles {
                state.toggle(tag);
            }
            let params = state.to_params(&page_one(), today());

            for tag in FacetTag::ALL {
                let (key, value) = tag.param();
                if params.get(key) == Some(value) {
                    prop_assert!(state.is_active(tag));
                }
                if !state.is_active(tag) && tag.counterpart().is_none_or(|c| !state.is_active(c)) {
                    prop_assert!(!params.contains_key(key));
                }
            }
            prop_assert_eq!(params.contains_key("search"), !state.trimmed_search().is_empty());
            prop_assert!(!params.contains_key("date_joined"));
        }

        #[test]
        fn property_every_active_facet_is_emitted(toggles in arb_facets()) {
            let mut state = FilterState::new();
            for tag in toggles {
                state.toggle(tag);
            }
            let params = state.to_params(&page_one(), today());
            for tag in &state.facets {
                let (key, value) = tag.param();
                prop_assert_eq!(params.get(key), Some(value));
            }
        }
    }
}
