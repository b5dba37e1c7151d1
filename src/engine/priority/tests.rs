use super::{week_bounds, MaintenancePrioritizer};
use crate::config::fleet_profile::PriorityProfile;
use crate::domain::maintenance::{MaintenanceItem, NewMaintenanceItem};
use crate::domain::types::{MaintenanceStatus, MaintenanceType};
use crate::engine::error::EngineError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

// ==========================================
// 测试辅助函数
// ==========================================

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2026-05-04 是周一
fn today() -> NaiveDate {
    day(2026, 5, 4)
}

fn item(
    id: i64,
    vehicle_id: i64,
    item_type: MaintenanceType,
    scheduled_date: NaiveDate,
    probability: Option<f64>,
) -> MaintenanceItem {
    MaintenanceItem {
        id,
        vehicle_id,
        item_type,
        description: format!("item {}", id),
        scheduled_date,
        status: MaintenanceStatus::Agendada,
        diagnostic_id: None,
        failure_probability: probability,
        completed_on: None,
        completed_km: None,
        cost: None,
        parts: None,
        notes: None,
    }
}

fn ids(items: &[MaintenanceItem]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}

/// 确定性伪随机维修项集合（线性同余）
fn generated_items(count: i64, seed: u64) -> Vec<MaintenanceItem> {
    let mut state = seed;
    let mut next = move |bound: u64| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) % bound
    };

    (1..=count)
        .map(|id| {
            let item_type = match next(3) {
                0 => MaintenanceType::Preventiva,
                1 => MaintenanceType::Preditiva,
                _ => MaintenanceType::Corretiva,
            };
            let probability = match item_type {
                MaintenanceType::Preditiva => Some(next(101) as f64 / 100.0),
                _ => None,
            };
            let offset = next(30) as i64 - 15;
            let mut it = item(id, next(4) as i64 + 1, item_type, today() + Duration::days(offset), probability);
            if offset < -3 && next(2) == 0 {
                it.status = MaintenanceStatus::Atrasada;
            }
            it
        })
        .collect()
}

// ==========================================
// 排序规则
// ==========================================

#[test]
fn test_tier_order_without_overdue() {
    let prioritizer = MaintenancePrioritizer::default();
    let week = today() + Duration::days(3);

    let items = vec![
        item(1, 1, MaintenanceType::Preventiva, week, None),
        item(2, 1, MaintenanceType::Preditiva, week, Some(0.5)),
        item(3, 1, MaintenanceType::Corretiva, week, None),
        item(4, 1, MaintenanceType::Preditiva, week, Some(0.85)),
        item(5, 1, MaintenanceType::Preditiva, week, Some(0.7)),
    ];

    let ranked = prioritizer.rank(items, today());
    assert_eq!(ids(&ranked), vec![3, 4, 5, 2, 1]);
}

#[test]
fn test_overdue_predictive_outranks_future_corrective() {
    let prioritizer = MaintenancePrioritizer::default();
    let items = vec![
        item(1, 2, MaintenanceType::Corretiva, today() + Duration::days(7), None),
        item(2, 5, MaintenanceType::Preditiva, today() - Duration::days(1), Some(0.9)),
    ];

    let ranked = prioritizer.rank(items, today());
    assert_eq!(ids(&ranked), vec![2, 1]);
}

#[test]
fn test_secondary_keys() {
    let prioritizer = MaintenancePrioritizer::default();
    let d1 = today() + Duration::days(2);
    let d2 = today() + Duration::days(5);

    let items = vec![
        // 同层预测性: 概率优先于日期
        item(10, 1, MaintenanceType::Preditiva, d1, Some(0.55)),
        item(11, 1, MaintenanceType::Preditiva, d2, Some(0.65)),
        // 预防性: 日期 → 车辆 → id
        item(20, 3, MaintenanceType::Preventiva, d2, None),
        item(21, 2, MaintenanceType::Preventiva, d2, None),
        item(19, 2, MaintenanceType::Preventiva, d2, None),
        item(22, 9, MaintenanceType::Preventiva, d1, None),
    ];

    let ranked = prioritizer.rank(items, today());
    assert_eq!(ids(&ranked), vec![11, 10, 22, 19, 21, 20]);
}

#[test]
fn test_predictive_without_probability_is_low_tier() {
    let prioritizer = MaintenancePrioritizer::default();
    let d = today() + Duration::days(1);
    let no_prob = item(1, 1, MaintenanceType::Preditiva, d, None);
    let low = item(2, 1, MaintenanceType::Preditiva, d, Some(0.2));

    assert_eq!(prioritizer.tier(&no_prob), 2);
    let ranked = prioritizer.rank(vec![no_prob, low], today());
    assert_eq!(ids(&ranked), vec![2, 1]);
}

#[test]
fn test_threshold_is_configurable() {
    let prioritizer = MaintenancePrioritizer::new(PriorityProfile {
        predictive_high_threshold: 0.5,
    });
    let it = item(1, 1, MaintenanceType::Preditiva, today(), Some(0.55));
    assert_eq!(prioritizer.tier(&it), 1);
    assert_eq!(MaintenancePrioritizer::default().tier(&it), 2);
}

#[test]
fn test_is_overdue() {
    let prioritizer = MaintenancePrioritizer::default();
    let mut it = item(1, 1, MaintenanceType::Preventiva, today() - Duration::days(1), None);
    assert!(prioritizer.is_overdue(&it, today()));

    it.scheduled_date = today();
    assert!(!prioritizer.is_overdue(&it, today()));

    it.status = MaintenanceStatus::Atrasada;
    assert!(prioritizer.is_overdue(&it, today()));

    it.status = MaintenanceStatus::Concluida;
    it.scheduled_date = today() - Duration::days(10);
    assert!(!prioritizer.is_overdue(&it, today()));
}

#[test]
fn test_overdue_transitions_only_flip_agendada() {
    let prioritizer = MaintenancePrioritizer::default();
    let mut done = item(3, 1, MaintenanceType::Corretiva, today() - Duration::days(4), None);
    done.status = MaintenanceStatus::Concluida;
    let mut late = item(4, 1, MaintenanceType::Corretiva, today() - Duration::days(4), None);
    late.status = MaintenanceStatus::Atrasada;

    let items = vec![
        item(1, 1, MaintenanceType::Preventiva, today() - Duration::days(1), None),
        item(2, 1, MaintenanceType::Preventiva, today(), None),
        done,
        late,
    ];

    assert_eq!(prioritizer.overdue_transitions(&items, today()), vec![1]);
}

// ==========================================
// 性质测试
// ==========================================

#[test]
fn test_rank_is_deterministic_and_input_order_independent() {
    let prioritizer = MaintenancePrioritizer::default();

    for seed in [1u64, 7, 42, 2026] {
        let items = generated_items(60, seed);
        let first = prioritizer.rank(items.clone(), today());
        let second = prioritizer.rank(items.clone(), today());
        assert_eq!(ids(&first), ids(&second));

        let mut reversed = items;
        reversed.reverse();
        let third = prioritizer.rank(reversed, today());
        assert_eq!(ids(&first), ids(&third));
    }
}

#[test]
fn test_overdue_items_precede_non_overdue_in_same_tier() {
    let prioritizer = MaintenancePrioritizer::default();

    for seed in [3u64, 11, 99] {
        let ranked = prioritizer.rank(generated_items(80, seed), today());
        for (i, a) in ranked.iter().enumerate() {
            for b in ranked.iter().skip(i + 1) {
                if prioritizer.tier(a) == prioritizer.tier(b) {
                    assert!(
                        !(prioritizer.is_overdue(b, today()) && !prioritizer.is_overdue(a, today())),
                        "item {} (overdue) ranked after item {}",
                        b.id,
                        a.id
                    );
                }
            }
        }
    }
}

// ==========================================
// 周视图
// ==========================================

#[test]
fn test_week_bounds_start_on_monday() {
    let (monday, sunday) = week_bounds(day(2026, 5, 7));
    assert_eq!(monday, day(2026, 5, 4));
    assert_eq!(monday.weekday(), Weekday::Mon);
    assert_eq!(sunday, day(2026, 5, 10));

    let (monday, _) = week_bounds(day(2026, 5, 10));
    assert_eq!(monday, day(2026, 5, 4));
}

#[test]
fn test_weekly_view_partitions_items_exactly() {
    let prioritizer = MaintenancePrioritizer::default();
    let items = generated_items(100, 5);
    let week_start = day(2026, 5, 6);

    let view = prioritizer.weekly_view(&items, week_start);
    let (monday, sunday) = week_bounds(week_start);

    assert_eq!(view.len(), 7);
    let keys: Vec<NaiveDate> = view.keys().copied().collect();
    let expected: Vec<NaiveDate> = (0..7).map(|o| monday + Duration::days(o)).collect();
    assert_eq!(keys, expected);

    for it in &items {
        let appearances = view
            .values()
            .flatten()
            .filter(|bucketed| bucketed.id == it.id)
            .count();
        if it.scheduled_date >= monday && it.scheduled_date <= sunday {
            assert_eq!(appearances, 1);
            assert!(view[&it.scheduled_date].iter().any(|b| b.id == it.id));
        } else {
            assert_eq!(appearances, 0);
        }
    }
}

#[test]
fn test_weekly_view_orders_within_day() {
    let prioritizer = MaintenancePrioritizer::default();
    let wed = day(2026, 5, 6);
    let items = vec![
        item(5, 2, MaintenanceType::Preventiva, wed, None),
        item(4, 3, MaintenanceType::Corretiva, wed, None),
        item(3, 1, MaintenanceType::Corretiva, wed, None),
        item(9, 1, MaintenanceType::Corretiva, day(2026, 5, 20), None),
    ];

    let view = prioritizer.weekly_view(&items, today());
    assert_eq!(ids(&view[&wed]), vec![3, 4, 5]);
    assert!(view[&today()].is_empty());
    assert_eq!(view.values().map(Vec::len).sum::<usize>(), 3);
}

// ==========================================
// 入库校验
// ==========================================

#[test]
fn test_missing_date_is_incomplete_schedule() {
    let prioritizer = MaintenancePrioritizer::default();
    let mut request = NewMaintenanceItem {
        vehicle_id: 1,
        item_type: MaintenanceType::Preventiva,
        description: "Troca de óleo".to_string(),
        scheduled_date: None,
        diagnostic_id: None,
        failure_probability: None,
    };

    assert!(matches!(
        prioritizer.validate_schedule(&request),
        Err(EngineError::IncompleteSchedule(_))
    ));

    request.scheduled_date = Some(today());
    assert_eq!(prioritizer.validate_schedule(&request).unwrap(), today());

    request.failure_probability = Some(1.5);
    assert!(matches!(
        prioritizer.validate_schedule(&request),
        Err(EngineError::InvalidInput(_))
    ));
}
