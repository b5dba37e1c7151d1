// ==========================================
// 告警生命周期集成测试
// ==========================================
// 目标: 已读标记、已读后重新产生告警、列表按创建先后排序、诊断追溯
// ==========================================


#[cfg(test)]
mod alert_lifecycle_test {
    use std::sync::Arc;

    use crate::test_helpers::{brake_submission, day, register_truck, setup};
    use fleetpred::api::ApiError;
    use fleetpred::app::AppState;
    use fleetpred::domain::{AlertFilter, AlertType};
    use fleetpred::engine::{FixedClock, FleetEventKind, OptionalEventPublisher};

    #[test]
    fn test_mark_read_closes_alert() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);
        let submitted = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();
        let alert_id = submitted.alert_id;

        let alert = env.state.alert_api.mark_alert_read(alert_id).unwrap();
        assert!(alert.read);
        assert_eq!(alert.vehicle_id, truck.id);

        let unread = env
            .state
            .alert_api
            .list_alerts(AlertFilter { read: Some(false) })
            .unwrap();
        assert!(unread.is_empty());
        let read = env
            .state
            .alert_api
            .list_alerts(AlertFilter { read: Some(true) })
            .unwrap();
        assert_eq!(read.len(), 1);
        assert!(env.events.kinds().contains(&FleetEventKind::AlertRead));
    }

    #[test]
    fn test_mark_unknown_alert_not_found() {
        let env = setup(day(2026, 5, 4));
        let err = env.state.alert_api.mark_alert_read(77).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_new_alert_after_previous_was_read() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);

        let first = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();
        env.state
            .alert_api
            .mark_alert_read(first.alert_id)
            .unwrap();

        let second = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();
        assert!(second.alert_created);
        assert_ne!(second.alert_id, first.alert_id);

        // 已读告警保持原状，不被改写
        let all = env.state.alert_api.list_alerts(AlertFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        let old = all
            .iter()
            .find(|a| a.id == first.alert_id)
            .unwrap();
        assert!(old.read);
        assert_eq!(old.diagnostic_id, Some(first.diagnostic.id));
    }

    #[test]
    fn test_list_is_most_recent_first() {
        let env = setup(day(2026, 5, 4));
        let (truck, components) = register_truck(
            &env.state,
            "ABC-1D23",
            182_000.0,
            &[("Motor", 90), ("Pneus", 90)],
        );

        let motor = env
            .state
            .fleet_api
            .record_inspection(components[0].id, 70, day(2026, 5, 4))
            .unwrap();
        let tyres = env
            .state
            .fleet_api
            .record_inspection(components[1].id, 30, day(2026, 5, 4))
            .unwrap();

        let alerts = env.state.alert_api.list_alerts(AlertFilter::default()).unwrap();
        let ids: Vec<Option<i64>> = alerts.iter().map(|a| Some(a.id)).collect();
        assert_eq!(ids, vec![tyres.alert_id, motor.alert_id]);
        assert_eq!(alerts[0].alert_type, AlertType::Critico);
        assert_eq!(alerts[1].alert_type, AlertType::Atencao);
        assert!(alerts.iter().all(|a| a.vehicle_id == truck.id));
        assert!(alerts.iter().all(|a| a.diagnostic_id.is_none()));
    }

    #[test]
    fn test_in_place_update_keeps_creation_order() {
        let env = setup(day(2026, 5, 4));
        let (truck, components) = register_truck(
            &env.state,
            "ABC-1D23",
            182_000.0,
            &[("Motor", 90), ("Pneus", 90)],
        );
        let at = |date| {
            AppState::from_connection(
                env.conn.clone(),
                Arc::new(FixedClock::at_date(date)),
                OptionalEventPublisher::none(),
            )
            .unwrap()
        };

        // 05-04 发动机告警，05-05 轮胎告警
        let motor = env
            .state
            .fleet_api
            .record_inspection(components[0].id, 70, day(2026, 5, 4))
            .unwrap();
        let tyres = at(day(2026, 5, 5))
            .fleet_api
            .record_inspection(components[1].id, 30, day(2026, 5, 5))
            .unwrap();

        // 05-06 发动机再次越界: 就地更新较早的告警
        let motor_again = at(day(2026, 5, 6))
            .fleet_api
            .record_inspection(components[0].id, 60, day(2026, 5, 6))
            .unwrap();
        assert_eq!(motor_again.alert_id, motor.alert_id);

        let alerts = env.state.alert_api.list_alerts(AlertFilter::default()).unwrap();
        let ids: Vec<Option<i64>> = alerts.iter().map(|a| Some(a.id)).collect();
        assert_eq!(ids, vec![tyres.alert_id, motor.alert_id]);
        assert!(alerts[1].updated_at > alerts[0].created_at);

        let detail = env.state.fleet_api.get_vehicle_detail(truck.id).unwrap();
        let recent: Vec<Option<i64>> = detail.alerts.iter().map(|a| Some(a.id)).collect();
        assert_eq!(recent, vec![tyres.alert_id, motor.alert_id]);
    }

    #[test]
    fn test_diagnostics_traceable_from_occurrence() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);
        let submitted = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        let diagnostics = env
            .state
            .alert_api
            .list_diagnostics_for_occurrence(submitted.occurrence_id)
            .unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, submitted.diagnostic.id);

        let fetched = env
            .state
            .alert_api
            .get_diagnostic(submitted.diagnostic.id)
            .unwrap();
        assert_eq!(fetched.occurrence_id, submitted.occurrence_id);
        assert_eq!(fetched.justification, submitted.diagnostic.justification);
        assert_eq!(fetched.recommended_parts, submitted.diagnostic.recommended_parts);
    }
}
