// ==========================================
// 事件上报端到端测试
// ==========================================
// 目标: 上报 → 诊断 → 告警 → 预测性排期 的完整链路
// ==========================================


#[cfg(test)]
mod occurrence_submission_test {
    use crate::test_helpers::{brake_submission, count_rows, day, register_truck, setup};
    use fleetpred::api::ApiError;
    use fleetpred::domain::{
        AlertFilter, AlertType, MaintenanceType, OccurrenceStatus, OccurrenceSubmission, Severity,
    };
    use fleetpred::engine::FleetEventKind;

    #[test]
    fn test_brake_scenario_creates_diagnostic_alert_and_follow_up() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);

        let response = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        // 诊断
        let diagnostic = &response.diagnostic;
        assert_eq!(diagnostic.occurrence_id, response.occurrence_id);
        assert!((diagnostic.failure_probability - 0.58).abs() < 1e-9);
        assert_eq!(diagnostic.severity, Severity::Alta);
        assert_eq!(diagnostic.horizon_days, 26);
        assert_eq!(diagnostic.component, "Pastilhas e discos de freio");
        assert!(diagnostic
            .recommended_parts
            .iter()
            .any(|p| p.contains("freio") || p.contains("pastilha")));
        assert!(diagnostic.justification.contains("Freios: 40%"));

        // 事件以 em_analise 入账
        let occurrence = env
            .state
            .occurrence_api
            .get_occurrence(response.occurrence_id)
            .unwrap();
        assert_eq!(occurrence.status, OccurrenceStatus::EmAnalise);
        assert_eq!(occurrence.occurred_on, day(2026, 5, 4));

        // 告警
        assert!(response.alert_created);
        let alerts = env.state.alert_api.list_alerts(AlertFilter::default()).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Critico);
        assert_eq!(alerts[0].diagnostic_id, Some(diagnostic.id));
        assert!(alerts[0].message.starts_with("CRÍTICO: Pastilhas e discos de freio no ABC-1D23"));
        assert!(alerts[0].message.contains("58%"));

        // 预测性排期: 提交日 + ceil(26/2) 天
        let maintenance_id = response.maintenance_id.expect("follow-up scheduled");
        let item = env
            .state
            .maintenance_api
            .get_maintenance_item(maintenance_id)
            .unwrap();
        assert_eq!(item.item_type, MaintenanceType::Preditiva);
        assert_eq!(item.scheduled_date, day(2026, 5, 17));
        assert_eq!(item.diagnostic_id, Some(diagnostic.id));
        assert_eq!(item.failure_probability, Some(0.58));

        let kinds = env.events.kinds();
        assert!(kinds.contains(&FleetEventKind::OccurrenceDiagnosed));
        assert!(kinds.contains(&FleetEventKind::AlertCreated));
        assert!(kinds.contains(&FleetEventKind::MaintenanceScheduled));
    }

    #[test]
    fn test_empty_symptoms_write_nothing() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);

        let mut submission = brake_submission(truck.id);
        submission.symptoms.clear();
        let err = env
            .state
            .occurrence_api
            .submit_occurrence(submission)
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert_eq!(count_rows(&env.conn, "occurrences"), 0);
        assert_eq!(count_rows(&env.conn, "diagnostics"), 0);
        assert_eq!(count_rows(&env.conn, "alerts"), 0);
        assert_eq!(count_rows(&env.conn, "maintenance_items"), 0);
    }

    #[test]
    fn test_unmapped_system_is_surfaced() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);

        let err = env
            .state
            .occurrence_api
            .submit_occurrence(OccurrenceSubmission {
                vehicle_id: truck.id,
                system: "Sistema Elétrico".to_string(),
                symptoms: vec!["Bateria fraca".to_string()],
                description: "Não dá partida pela manhã".to_string(),
                severity: Severity::Media,
                odometer_km: 182_000.0,
            })
            .unwrap_err();

        match err {
            ApiError::UnmappedSystem(system) => assert_eq!(system, "Sistema Elétrico"),
            other => panic!("Expected UnmappedSystem, got {:?}", other),
        }
        assert_eq!(count_rows(&env.conn, "occurrences"), 0);
    }

    #[test]
    fn test_unknown_or_inactive_vehicle_not_found() {
        let env = setup(day(2026, 5, 4));
        let err = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(999))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);
        env.state.fleet_api.deactivate_vehicle(truck.id).unwrap();
        let err = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(count_rows(&env.conn, "occurrences"), 0);
    }

    #[test]
    fn test_repeat_submission_updates_open_alert_and_uses_history() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);

        let first = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();
        let second = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        // 同一 (车辆, 部件) 只保留一条未读告警，指向最新诊断
        assert!(!second.alert_created);
        assert_eq!(second.alert_id, first.alert_id);
        let unread = env
            .state
            .alert_api
            .list_alerts(AlertFilter { read: Some(false) })
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].diagnostic_id, Some(second.diagnostic.id));

        // 第二次诊断参考了第一次上报: 相关度 1.0 → 概率 +0.1
        assert!((second.diagnostic.failure_probability - 0.68).abs() < 1e-9);
        assert!(second
            .diagnostic
            .justification
            .starts_with("Baseado em 1 ocorrência(s) anterior(es)"));

        // 两条诊断，各自独立
        assert_eq!(count_rows(&env.conn, "diagnostics"), 2);
        assert!(env
            .events
            .kinds()
            .contains(&FleetEventKind::AlertUpdated));
    }

    #[test]
    fn test_low_probability_skips_follow_up() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "XYZ-9K88", 90_000.0, &[("Suspensão", 95)]);

        let response = env
            .state
            .occurrence_api
            .submit_occurrence(OccurrenceSubmission {
                vehicle_id: truck.id,
                system: "suspensao".to_string(),
                symptoms: vec![first_suspension_symptom()],
                description: "Leve ruído em lombadas".to_string(),
                severity: Severity::Baixa,
                odometer_km: 90_500.0,
            })
            .unwrap();

        assert_eq!(response.diagnostic.severity, Severity::Baixa);
        assert!(response.maintenance_id.is_none());
        let alerts = env.state.alert_api.list_alerts(AlertFilter::default()).unwrap();
        assert_eq!(alerts[0].alert_type, AlertType::Info);
        assert!(alerts[0].message.starts_with("INFO:"));
    }

    fn first_suspension_symptom() -> String {
        let catalog = fleetpred::engine::SymptomCatalog::standard();
        let profile = catalog
            .profile(fleetpred::domain::VehicleSystem::Suspensao)
            .unwrap();
        profile.symptoms[0].to_string()
    }

    #[test]
    fn test_get_diagnostic_not_found() {
        let env = setup(day(2026, 5, 4));
        let err = env.state.alert_api.get_diagnostic(42).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
