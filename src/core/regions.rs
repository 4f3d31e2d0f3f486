use crate::models::Region;

impl Region {
    /// Two-letter state codes making up the region. Regions overlap.
    pub fn states(self) -> &'static [&'static str] {
        match self {
            Region::PacificNorthwest => &["WA", "OR", "ID", "AK"],
            Region::WestCoast => &["CA", "WA", "OR"],
            Region::Southwest => &["AZ", "NM", "NV", "UT", "CO"],
            Region::MountainWest => &["MT", "WY", "CO", "ID", "UT", "NV"],
            Region::Midwest => &[
                "IL", "IN", "MI", "OH", "WI", "IA", "MN", "MO", "ND", "SD", "NE", "KS",
            ],
            Region::South => &[
                "TX", "OK", "AR", "LA", "MS", "AL", "TN", "KY", "WV", "VA", "NC", "SC", "GA", "FL",
            ],
            Region::Southeast => &["NC", "SC", "GA", "FL", "AL", "MS", "TN", "KY"],
            Region::MidAtlantic => &["NY", "NJ", "PA", "DE", "MD", "DC", "VA", "WV"],
            Region::Northeast => &["ME", "NH", "VT", "MA", "RI", "CT", "NY", "NJ", "PA"],
            Region::NewEngland => &["ME", "NH", "VT", "MA", "RI", "CT"],
        }
    }

    #[inline]
    pub fn contains_state(self, state: &str) -> bool {
        self.states().contains(&state)
    }
}

/// Union of the member states of every region, in first-seen order
pub fn expand_regions(regions: &[Region]) -> Vec<String> {
    let mut states: Vec<String> = Vec::new();
    for state in regions.iter().flat_map(|region| region.states()) {
        if !states.iter().any(|s| s == state) {
            states.push((*state).to_string());
        }
    }
    states
}

/// Whether `state` belongs to any of the given regions
pub fn is_in_regions(state: &str, regions: &[Region]) -> bool {
    regions.iter().any(|region| region.contains_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_single_region() {
        let states = expand_regions(&[Region::PacificNorthwest]);
        assert_eq!(states, vec!["WA", "OR", "ID", "AK"]);
    }

    #[test]
    fn test_expand_overlapping_regions_deduplicates() {
        let states = expand_regions(&[Region::PacificNorthwest, Region::WestCoast]);
        assert_eq!(states, vec!["WA", "OR", "ID", "AK", "CA"]);
    }

    #[test]
    fn test_expand_empty() {
        assert!(expand_regions(&[]).is_empty());
    }

    #[test]
    fn test_state_membership() {
        assert!(is_in_regions("VT", &[Region::NewEngland]));
        assert!(!is_in_regions("TX", &[Region::NewEngland, Region::Midwest]));
        assert!(Region::MidAtlantic.contains_state("DC"));
    }
}
