// ==========================================
// 车队预测性维护系统 - 演示数据库重置与灌数
// ==========================================
// 用法: seed_demo_fleet [db_path]
// 说明: 已有库先备份再删除；全部数据经 API 写入
// ==========================================

use chrono::{Duration, Local, NaiveDate};
use std::error::Error;
use std::fs;
use std::path::Path;

use fleetpred::app::{get_default_db_path, AppState};
use fleetpred::domain::{
    MaintenanceCompletion, MaintenanceType, NewComponent, NewMaintenanceItem, NewVehicle,
    OccurrenceSubmission, Severity,
};

const COMPONENT_NAMES: [&str; 7] = [
    "Motor",
    "Freios",
    "Arrefecimento",
    "Transmissão",
    "Suspensão",
    "Pneus",
    "Sistema Elétrico",
];

const MODELS: [(&str, &str); 4] = [
    ("Volvo FH 540", "D13K540"),
    ("Scania R450", "DC13 450"),
    ("Mercedes Actros 2651", "OM 471"),
    ("DAF XF 480", "MX-13"),
];

fn main() -> Result<(), Box<dyn Error>> {
    fleetpred::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    let today = Local::now().date_naive();

    let vehicle_ids = seed_vehicles(&state, today)?;
    seed_maintenance(&state, &vehicle_ids, today)?;
    seed_occurrences(&state, &vehicle_ids)?;

    print_quick_counts(&state, today)?;
    eprintln!("Seeded demo fleet into {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 10 台卡车，每台 7 个部件
fn seed_vehicles(state: &AppState, today: NaiveDate) -> Result<Vec<i64>, Box<dyn Error>> {
    let mut ids = Vec::new();
    for idx in 0..10_i64 {
        let (model, engine) = MODELS[(idx as usize) % MODELS.len()];
        let odometer = 80_000.0 + (idx as f64) * 31_500.0;
        let vehicle = state.fleet_api.register_vehicle(NewVehicle {
            plate: format!("FLT-{}A{:02}", 1 + idx % 9, 10 + idx * 7),
            model: model.to_string(),
            year: 2016 + (idx % 8) as i32,
            engine: engine.to_string(),
            odometer_km: odometer,
            registered_on: today - Duration::days(400 + idx * 30),
            last_oil_change_km: Some(odometer - 8_000.0),
        })?;

        for (c_idx, name) in COMPONENT_NAMES.iter().enumerate() {
            state.fleet_api.register_component(NewComponent {
                vehicle_id: vehicle.id,
                name: name.to_string(),
                health_pct: component_health(idx, c_idx as i64),
                last_inspection: Some(today - Duration::days(10 + (idx + c_idx as i64) % 20)),
            })?;
        }
        ids.push(vehicle.id);
    }
    Ok(ids)
}

/// 确定性的健康度分布: 大部分良好，少数关注/危险
fn component_health(vehicle_idx: i64, component_idx: i64) -> u8 {
    let base = 95 - ((vehicle_idx * 13 + component_idx * 7) % 30);
    let health = match (vehicle_idx, component_idx) {
        (2, 1) => 42,
        (5, 0) => 48,
        (7, 2) => 66,
        _ => base,
    };
    health.clamp(0, 100) as u8
}

fn seed_maintenance(
    state: &AppState,
    vehicle_ids: &[i64],
    today: NaiveDate,
) -> Result<(), Box<dyn Error>> {
    for (idx, vehicle_id) in vehicle_ids.iter().enumerate() {
        let idx = idx as i64;

        // 已完工的预防性保养（成本报表）
        let done = state.maintenance_api.schedule_maintenance(NewMaintenanceItem {
            vehicle_id: *vehicle_id,
            item_type: MaintenanceType::Preventiva,
            description: "Troca de óleo e filtros".to_string(),
            scheduled_date: Some(today - Duration::days(20 + idx)),
            diagnostic_id: None,
            failure_probability: None,
        })?;
        state.maintenance_api.complete_maintenance(
            done.id,
            MaintenanceCompletion {
                completed_on: today - Duration::days(19 + idx),
                completed_km: None,
                cost: Some(850.0 + (idx as f64) * 45.0),
                parts: Some("Filtro de óleo, Filtro de ar, Óleo 15W40".to_string()),
                notes: None,
            },
        )?;

        // 未来的预防性保养
        state.maintenance_api.schedule_maintenance(NewMaintenanceItem {
            vehicle_id: *vehicle_id,
            item_type: MaintenanceType::Preventiva,
            description: "Revisão programada".to_string(),
            scheduled_date: Some(today + Duration::days(idx % 7)),
            diagnostic_id: None,
            failure_probability: None,
        })?;

        // 部分车辆有逾期的纠正性维修
        if idx % 4 == 1 {
            state.maintenance_api.schedule_maintenance(NewMaintenanceItem {
                vehicle_id: *vehicle_id,
                item_type: MaintenanceType::Corretiva,
                description: "Substituir mangueira do radiador".to_string(),
                scheduled_date: Some(today - Duration::days(2)),
                diagnostic_id: None,
                failure_probability: None,
            })?;
        }
    }
    Ok(())
}

fn seed_occurrences(state: &AppState, vehicle_ids: &[i64]) -> Result<(), Box<dyn Error>> {
    let samples = [
        (2_usize, "Freios", vec!["Ruído ao frear", "Vibração"], Severity::Alta),
        (5, "Motor", vec!["Perda de potência"], Severity::Media),
        (7, "Arrefecimento", vec!["Temperatura elevada"], Severity::Critica),
    ];

    for (idx, system, symptoms, severity) in samples {
        let Some(vehicle_id) = vehicle_ids.get(idx) else {
            continue;
        };
        let detail = state.fleet_api.get_vehicle_detail(*vehicle_id)?;
        state.occurrence_api.submit_occurrence(OccurrenceSubmission {
            vehicle_id: *vehicle_id,
            system: system.to_string(),
            symptoms: symptoms.into_iter().map(String::from).collect(),
            description: format!("Relato do motorista: {}", system.to_lowercase()),
            severity,
            odometer_km: detail.vehicle.odometer_km,
        })?;
    }
    Ok(())
}

fn print_quick_counts(state: &AppState, today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let stats = state.report_api.dashboard_stats(today)?;
    let queue = state.maintenance_api.get_priority_queue()?;
    eprintln!(
        "vehicles={} ok={} atencao={} critico={} unread_alerts={} pending_maintenance={}",
        stats.active_vehicles,
        stats.status_ok,
        stats.status_atencao,
        stats.status_critico,
        stats.unread_alerts,
        queue.len()
    );
    Ok(())
}
