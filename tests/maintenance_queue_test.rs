// ==========================================
// 维修排期与优先级队列集成测试
// ==========================================
// 目标: 排期校验、逾期刷新、优先级队列、周视图、完工
// ==========================================


#[cfg(test)]
mod maintenance_queue_test {
    use crate::test_helpers::{brake_submission, count_rows, day, register_truck, setup};
    use fleetpred::api::ApiError;
    use fleetpred::domain::{
        AlertFilter, MaintenanceCompletion, MaintenanceStatus, MaintenanceType, NewMaintenanceItem,
    };
    use fleetpred::engine::FleetEventKind;

    fn item(
        vehicle_id: i64,
        item_type: MaintenanceType,
        date: Option<chrono::NaiveDate>,
        probability: Option<f64>,
    ) -> NewMaintenanceItem {
        NewMaintenanceItem {
            vehicle_id,
            item_type,
            description: format!("Serviço {}", item_type),
            scheduled_date: date,
            diagnostic_id: None,
            failure_probability: probability,
        }
    }

    fn completion(on: chrono::NaiveDate, cost: f64) -> MaintenanceCompletion {
        MaintenanceCompletion {
            completed_on: on,
            completed_km: Some(183_000.0),
            cost: Some(cost),
            parts: Some("Kit pastilhas eixo dianteiro".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_overdue_predictive_outranks_future_corrective() {
        // 2026-05-06 为周三
        let env = setup(day(2026, 5, 6));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);
        let api = &env.state.maintenance_api;

        let corrective = api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Corretiva,
                Some(day(2026, 5, 12)),
                None,
            ))
            .unwrap();
        let predictive = api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Preditiva,
                Some(day(2026, 5, 5)),
                Some(0.9),
            ))
            .unwrap();

        let queue = api.get_priority_queue().unwrap();
        let ids: Vec<i64> = queue.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![predictive.id, corrective.id]);
        assert_eq!(queue[0].status, MaintenanceStatus::Atrasada);
        assert_eq!(queue[1].status, MaintenanceStatus::Agendada);
        assert!(env.events.kinds().contains(&FleetEventKind::MaintenanceOverdue));

        // 幂等: 再次读取顺序不变，不再产生逾期事件
        let before = env.events.events().len();
        let again: Vec<i64> = api.get_priority_queue().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(again, ids);
        assert_eq!(env.events.events().len(), before);
    }

    #[test]
    fn test_tier_order_without_overdue() {
        let env = setup(day(2026, 5, 6));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);
        let api = &env.state.maintenance_api;
        let date = Some(day(2026, 5, 8));

        let preventive = api
            .schedule_maintenance(item(truck.id, MaintenanceType::Preventiva, date, None))
            .unwrap();
        let low = api
            .schedule_maintenance(item(truck.id, MaintenanceType::Preditiva, date, Some(0.4)))
            .unwrap();
        let high = api
            .schedule_maintenance(item(truck.id, MaintenanceType::Preditiva, date, Some(0.85)))
            .unwrap();
        let corrective = api
            .schedule_maintenance(item(truck.id, MaintenanceType::Corretiva, date, None))
            .unwrap();

        let ids: Vec<i64> = api.get_priority_queue().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![corrective.id, high.id, low.id, preventive.id]);
    }

    #[test]
    fn test_missing_date_is_incomplete_schedule() {
        let env = setup(day(2026, 5, 6));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);

        let err = env
            .state
            .maintenance_api
            .schedule_maintenance(item(truck.id, MaintenanceType::Preventiva, None, None))
            .unwrap_err();
        assert!(matches!(err, ApiError::IncompleteSchedule(_)));
        assert_eq!(count_rows(&env.conn, "maintenance_items"), 0);
    }

    #[test]
    fn test_weekly_calendar_covers_monday_to_sunday() {
        let env = setup(day(2026, 5, 6));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);
        let api = &env.state.maintenance_api;

        let monday = api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Preventiva,
                Some(day(2026, 5, 4)),
                None,
            ))
            .unwrap();
        let sunday = api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Corretiva,
                Some(day(2026, 5, 10)),
                None,
            ))
            .unwrap();
        api.schedule_maintenance(item(
            truck.id,
            MaintenanceType::Corretiva,
            Some(day(2026, 5, 11)),
            None,
        ))
        .unwrap();

        let calendar = api.get_weekly_calendar(day(2026, 5, 6)).unwrap();
        assert_eq!(calendar.len(), 7);
        assert_eq!(calendar.keys().next(), Some(&day(2026, 5, 4)));
        assert_eq!(calendar.keys().last(), Some(&day(2026, 5, 10)));

        let placed: Vec<i64> = calendar.values().flatten().map(|i| i.id).collect();
        assert_eq!(placed, vec![monday.id, sunday.id]);
        assert!(calendar[&day(2026, 5, 6)].is_empty());
        // 周一的项目在 "今天" 之前，已转为逾期但仍在日历中
        assert_eq!(calendar[&day(2026, 5, 4)][0].status, MaintenanceStatus::Atrasada);
    }

    #[test]
    fn test_complete_twice_is_invalid_input() {
        let env = setup(day(2026, 5, 6));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[]);
        let api = &env.state.maintenance_api;

        let scheduled = api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Preventiva,
                Some(day(2026, 5, 6)),
                None,
            ))
            .unwrap();
        let done = api
            .complete_maintenance(scheduled.id, completion(day(2026, 5, 6), 900.0))
            .unwrap();
        assert_eq!(done.status, MaintenanceStatus::Concluida);
        assert_eq!(done.cost, Some(900.0));
        assert!(api.get_priority_queue().unwrap().is_empty());

        let err = api
            .complete_maintenance(scheduled.id, completion(day(2026, 5, 7), 100.0))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        let unchanged = api.get_maintenance_item(scheduled.id).unwrap();
        assert_eq!(unchanged.cost, Some(900.0));
    }

    #[test]
    fn test_corrective_completion_clears_linked_alerts() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(
            &env.state,
            "ABC-1D23",
            182_000.0,
            &[("Freios", 40), ("Motor", 45)],
        );

        let submitted = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        // 另一部件的健康告警
        let motor = env
            .state
            .fleet_api
            .get_vehicle_detail(truck.id)
            .unwrap()
            .components
            .into_iter()
            .find(|c| c.name == "Motor")
            .unwrap();
        env.state
            .fleet_api
            .record_inspection(motor.id, 44, day(2026, 5, 4))
            .unwrap();
        assert_eq!(
            env.state
                .alert_api
                .list_alerts(AlertFilter { read: Some(false) })
                .unwrap()
                .len(),
            2
        );

        // 纠正性维修关联诊断，沿用其概率
        let mut request = item(
            truck.id,
            MaintenanceType::Corretiva,
            Some(day(2026, 5, 5)),
            None,
        );
        request.diagnostic_id = Some(submitted.diagnostic.id);
        let corrective = env
            .state
            .maintenance_api
            .schedule_maintenance(request)
            .unwrap();
        assert_eq!(corrective.failure_probability, Some(0.58));

        env.state
            .maintenance_api
            .complete_maintenance(corrective.id, completion(day(2026, 5, 5), 3100.0))
            .unwrap();

        let unread = env
            .state
            .alert_api
            .list_alerts(AlertFilter { read: Some(false) })
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].component, "Motor");
    }

    #[test]
    fn test_unlinked_corrective_completion_clears_whole_vehicle() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);
        env.state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        let corrective = env
            .state
            .maintenance_api
            .schedule_maintenance(item(
                truck.id,
                MaintenanceType::Corretiva,
                Some(day(2026, 5, 5)),
                None,
            ))
            .unwrap();
        env.state
            .maintenance_api
            .complete_maintenance(corrective.id, completion(day(2026, 5, 5), 1500.0))
            .unwrap();

        assert!(env
            .state
            .alert_api
            .list_alerts(AlertFilter { read: Some(false) })
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_diagnostic_of_other_vehicle_rejected() {
        let env = setup(day(2026, 5, 4));
        let (truck, _) = register_truck(&env.state, "ABC-1D23", 182_000.0, &[("Freios", 40)]);
        let (other, _) = register_truck(&env.state, "DEF-4G56", 120_000.0, &[]);
        let submitted = env
            .state
            .occurrence_api
            .submit_occurrence(brake_submission(truck.id))
            .unwrap();

        let mut request = item(
            other.id,
            MaintenanceType::Preditiva,
            Some(day(2026, 5, 9)),
            None,
        );
        request.diagnostic_id = Some(submitted.diagnostic.id);
        let err = env
            .state
            .maintenance_api
            .schedule_maintenance(request)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
