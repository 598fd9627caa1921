use serde::Serialize;

use crate::constants::PROJECT_ROSTERS;

/// A hardware project and the chips students are expected to submit for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HdlProject {
    /// Project number, as numbered in the course.
    number: u8,
    /// Canonical chip names, in roster order.
    chips:  Vec<String>,
}

impl HdlProject {
    /// Creates a project with an explicit roster.
    pub fn new<I, S>(number: u8, chips: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            number,
            chips: chips.into_iter().map(Into::into).collect(),
        }
    }

    /// Every project in the catalog.
    pub fn all() -> Vec<Self> {
        PROJECT_ROSTERS
            .iter()
            .map(|(number, chips)| Self::new(*number, chips.iter().copied()))
            .collect()
    }

    /// Looks a project up by number.
    pub fn by_number(number: u8) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|project| project.number == number)
    }

    /// Finds the project whose roster contains `chip`, ignoring case.
    pub fn for_chip(chip: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|project| project.canonical(chip).is_some())
    }

    /// Project number.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Canonical chip names, in roster order.
    pub fn chips(&self) -> &[String] {
        &self.chips
    }

    /// Returns the roster's spelling of `chip`, ignoring case.
    pub fn canonical(&self, chip: &str) -> Option<&str> {
        self.chips
            .iter()
            .find(|name| name.eq_ignore_ascii_case(chip))
            .map(String::as_str)
    }

    /// Name of this project's directory in the fixture store.
    pub fn fixture_dir_name(&self) -> String {
        format!("p{}", self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chips_resolve_to_their_project() {
        let project = HdlProject::for_chip("ram8").expect("RAM8 belongs to a project");
        assert_eq!(project.number(), 3);
        assert_eq!(project.canonical("ram8"), Some("RAM8"));
        assert_eq!(project.fixture_dir_name(), "p3");
        assert_eq!(project.chips().len(), 8);
    }

    #[test]
    fn unknown_chips_have_no_project() {
        assert!(HdlProject::for_chip("Blinkenlights").is_none());
        assert!(HdlProject::by_number(4).is_none());
    }

    #[test]
    fn rosters_do_not_overlap() {
        let projects = HdlProject::all();
        for project in &projects {
            for chip in project.chips() {
                let owner = HdlProject::for_chip(chip).expect("every chip has a project");
                assert_eq!(owner.number(), project.number(), "{chip} is listed twice");
            }
        }
    }
}
