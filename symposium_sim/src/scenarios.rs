//! Contention scenarios for DST.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// DST-001: Full course at the configured size, ledger audited
    FullTable,

    /// DST-002: The two-seat acceptance run, exactly twenty bites
    TableForTwo,

    /// DST-003: Stop mid-course, verify reset, run a fresh course
    Restart,

    /// DST-004: Clamped resizing, locked while running, rebuild and run
    Resize,

    /// DST-005: Every size from two to ten seats, back to back
    Gauntlet,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::FullTable,
            ScenarioId::TableForTwo,
            ScenarioId::Restart,
            ScenarioId::Resize,
            ScenarioId::Gauntlet,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::FullTable => "full_table",
            ScenarioId::TableForTwo => "table_for_two",
            ScenarioId::Restart => "restart",
            ScenarioId::Resize => "resize",
            ScenarioId::Gauntlet => "gauntlet",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::FullTable => "Run the configured party to empty plates, audit the ledger throughout",
            ScenarioId::TableForTwo => "Two seats, both sharing both chopsticks, exactly 20 bites",
            ScenarioId::Restart => "Stop a dinner mid-course, verify full plates, then run a fresh course",
            ScenarioId::Resize => "Clamp at both bounds, refuse resizing while running, rerun after rebuild",
            ScenarioId::Gauntlet => "Every supported size from 2 to 10 runs to completion back to back",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full_table" | "fulltable" | "dst-001" => Ok(ScenarioId::FullTable),
            "table_for_two" | "tablefortwo" | "two" | "dst-002" => Ok(ScenarioId::TableForTwo),
            "restart" | "dst-003" => Ok(ScenarioId::Restart),
            "resize" | "dst-004" => Ok(ScenarioId::Resize),
            "gauntlet" | "dst-005" => Ok(ScenarioId::Gauntlet),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios_parse_by_name() {
        for scenario in ScenarioId::all() {
            let parsed: ScenarioId = scenario.name().parse().unwrap();
            assert_eq!(parsed, scenario);
        }
    }

    #[test]
    fn test_unknown_scenario_is_an_error() {
        let err = "banquet".parse::<ScenarioId>().unwrap_err();
        assert!(err.contains("banquet"));
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(ScenarioId::TableForTwo.to_string(), "table_for_two");
    }
}
