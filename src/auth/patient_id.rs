// ABOUTME: Patient identifier discovery from the logged-in Glooko web application state
// ABOUTME: Checks known page variables in priority order, then scans inline scripts for glooko codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Script evaluated in the logged-in page
///
/// Returns `{ variables: [..4], scripts: [..] }`: the four known page variables in
/// priority order (null when unset) and the text of every inline script.
pub const PAGE_STATE_SCRIPT: &str = r"
var read = function (f) { try { var v = f(); return v === undefined ? null : v; } catch (e) { return null; } };
return {
  variables: [
    read(function () { return window.patient; }),
    read(function () { return window.current_user_glooko_code; }),
    read(function () { return window.analyticsUser && window.analyticsUser.glooko_code; }),
    read(function () { return window.userData && window.userData.glookoCode; })
  ],
  scripts: Array.prototype.map.call(document.querySelectorAll('script'), function (s) {
    return s.textContent || '';
  })
};
";

/// Patterns tried against each script, in order
static SCRIPT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"window\.patient\s*=\s*["']([^"']+)["']"#,
        r#"window\.current_user_glooko_code\s*=\s*["']([^"']+)["']"#,
        r#""glooko_code":\s*"([^"]+)""#,
        r#""patient":\s*"([^"]+)""#,
        r"(eu-west-1-[a-zA-Z0-9\-]+)",
        r"(us-east-1-[a-zA-Z0-9\-]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Resolve the patient identifier from an evaluated [`PAGE_STATE_SCRIPT`] result
///
/// The first non-empty string among `variables` wins; otherwise the scripts are
/// scanned with [`scan_scripts`].
#[must_use]
pub fn patient_id_from_page_state(state: &Value) -> Option<String> {
    let from_variables = state
        .get("variables")
        .and_then(Value::as_array)
        .and_then(|vars| {
            vars.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .find(|v| !v.is_empty())
        });

    if let Some(id) = from_variables {
        return Some(id.to_owned());
    }

    let scripts: Vec<&str> = state
        .get("scripts")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    scan_scripts(&scripts)
}

/// Scan script texts for an identifier
///
/// Scripts are visited in document order and, within each script, the patterns
/// in order. A candidate only counts when it contains a hyphen, which every
/// glooko code does.
#[must_use]
pub fn scan_scripts<S: AsRef<str>>(scripts: &[S]) -> Option<String> {
    scripts.iter().find_map(|script| {
        let content = script.as_ref();
        SCRIPT_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(content)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|candidate| candidate.contains('-'))
                .map(str::to_owned)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_follow_priority_order() {
        let state = json!({
            "variables": [null, "us-east-1-second", "us-east-1-third", null],
            "scripts": ["window.patient = 'eu-west-1-ignored';"]
        });
        assert_eq!(
            patient_id_from_page_state(&state).as_deref(),
            Some("us-east-1-second")
        );
    }

    #[test]
    fn test_blank_variables_fall_through_to_scripts() {
        let state = json!({
            "variables": ["", null, null, null],
            "scripts": ["var x = 1;", "window.current_user_glooko_code = \"eu-west-1-abc-def\";"]
        });
        assert_eq!(
            patient_id_from_page_state(&state).as_deref(),
            Some("eu-west-1-abc-def")
        );
    }

    #[test]
    fn test_candidate_without_hyphen_is_skipped() {
        let scripts = [r#"{"patient": "12345", "glooko_code": "us-east-1-real-code"}"#];
        assert_eq!(scan_scripts(&scripts).as_deref(), Some("us-east-1-real-code"));
    }

    #[test]
    fn test_bare_region_code_is_found() {
        let scripts = ["analytics.identify('us-east-1-zebra-42')"];
        assert_eq!(scan_scripts(&scripts).as_deref(), Some("us-east-1-zebra-42"));
    }

    #[test]
    fn test_earlier_script_wins_over_earlier_pattern() {
        let scripts = [
            "track('eu-west-1-from-first-script')",
            "window.patient = 'us-east-1-from-second-script';",
        ];
        assert_eq!(
            scan_scripts(&scripts).as_deref(),
            Some("eu-west-1-from-first-script")
        );
    }

    #[test]
    fn test_nothing_found() {
        let state = json!({ "variables": [null, null, null, null], "scripts": ["var a = 1;"] });
        assert_eq!(patient_id_from_page_state(&state), None);
        assert_eq!(patient_id_from_page_state(&json!(null)), None);
    }
}
