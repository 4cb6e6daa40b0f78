// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use crate::crd::Condition;
    use crate::reconcilers::status::{
        conditions_equal, create_condition, find_condition, update_condition_in_memory,
    };

    const CONDITION_TYPE_READY: &str = "Ready";
    const STATUS_TRUE: &str = "True";
    const STATUS_FALSE: &str = "False";
    const REASON_RESOLVED: &str = "Resolved";
    const MESSAGE_RESOLVED: &str = "Deployment myapp is bound to environment stage";

    fn condition_at(status: &str, reason: &str, message: &str, time: &str) -> Condition {
        Condition {
            r#type: CONDITION_TYPE_READY.to_string(),
            status: status.to_string(),
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
            last_transition_time: Some(time.to_string()),
        }
    }

    #[test]
    fn test_create_condition_basic() {
        let condition = create_condition(
            CONDITION_TYPE_READY,
            STATUS_TRUE,
            REASON_RESOLVED,
            MESSAGE_RESOLVED,
        );

        assert_eq!(condition.r#type, CONDITION_TYPE_READY);
        assert_eq!(condition.status, STATUS_TRUE);
        assert_eq!(condition.reason, Some(REASON_RESOLVED.to_string()));
        assert_eq!(condition.message, Some(MESSAGE_RESOLVED.to_string()));

        let timestamp = condition.last_transition_time.unwrap();
        assert!(timestamp.contains('T'));
    }

    #[test]
    fn test_find_condition() {
        let conditions = vec![
            create_condition("Ready", STATUS_TRUE, "Resolved", "ok"),
            create_condition("Progressing", STATUS_FALSE, "Complete", "done"),
        ];

        assert_eq!(
            find_condition(&conditions, "Progressing").unwrap().status,
            STATUS_FALSE
        );
        assert!(find_condition(&conditions, "Degraded").is_none());
        assert!(find_condition(&[], "Ready").is_none());
    }

    #[test]
    fn test_update_condition_in_memory_adds_missing_condition() {
        let mut conditions = Vec::new();

        update_condition_in_memory(&mut conditions, "Ready", STATUS_TRUE, "Resolved", "ok");

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].reason.as_deref(), Some("Resolved"));
    }

    #[test]
    fn test_update_condition_in_memory_preserves_time_when_status_unchanged() {
        let original_time = "2025-01-01T00:00:00Z";
        let mut conditions = vec![condition_at(
            STATUS_FALSE,
            "EnvironmentNotFound",
            "missing",
            original_time,
        )];

        update_condition_in_memory(
            &mut conditions,
            "Ready",
            STATUS_FALSE,
            "DeploymentNotFound",
            "still missing",
        );

        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].reason.as_deref(), Some("DeploymentNotFound"));
        assert_eq!(
            conditions[0].last_transition_time.as_deref(),
            Some(original_time)
        );
    }

    #[test]
    fn test_update_condition_in_memory_resets_time_on_transition() {
        let original_time = "2025-01-01T00:00:00Z";
        let mut conditions = vec![condition_at(
            STATUS_FALSE,
            "EnvironmentNotFound",
            "missing",
            original_time,
        )];

        update_condition_in_memory(&mut conditions, "Ready", STATUS_TRUE, "Resolved", "ok");

        assert_eq!(conditions[0].status, STATUS_TRUE);
        assert_ne!(
            conditions[0].last_transition_time.as_deref(),
            Some(original_time)
        );
    }

    #[test]
    fn test_conditions_equal_ignores_timestamps() {
        let current = vec![condition_at(STATUS_TRUE, "Resolved", "ok", "2025-01-01T00:00:00Z")];
        let new = vec![condition_at(STATUS_TRUE, "Resolved", "ok", "2025-06-01T00:00:00Z")];

        assert!(conditions_equal(&current, &new));
    }

    #[test]
    fn test_conditions_equal_detects_differences() {
        let current = vec![condition_at(STATUS_TRUE, "Resolved", "ok", "t")];
        let changed_reason = vec![condition_at(STATUS_TRUE, "Other", "ok", "t")];

        assert!(!conditions_equal(&current, &changed_reason));
        assert!(!conditions_equal(&current, &[]));
        assert!(conditions_equal(&[], &[]));
    }
}
