// ==========================================
// 车队预测性维护系统 - 命令行入口
// ==========================================
// 用法: fleetpred <命令> [参数]
// 输出: JSON (stdout)；日志写 stderr
// ==========================================

use anyhow::{bail, Context};
use chrono::NaiveDate;
use fleetpred::app::{get_default_db_path, AppState};
use fleetpred::domain::AlertFilter;
use serde::Serialize;

const USAGE: &str = "用法: fleetpred <queue | calendar [YYYY-MM-DD] | alerts [--unread] | \
                     vehicles | vehicle <id> | diagnostic <id> | dashboard | costs | config>";

fn main() -> anyhow::Result<()> {
    fleetpred::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{} {}", fleetpred::APP_NAME, fleetpred::VERSION);
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let today = state.clock.today();

    match command.as_str() {
        "queue" => print_json(&state.maintenance_api.get_priority_queue()?),
        "calendar" => {
            let week_start = match args.get(1) {
                Some(raw) => parse_date(raw)?,
                None => today,
            };
            print_json(&state.maintenance_api.get_weekly_calendar(week_start)?)
        }
        "alerts" => {
            let filter = AlertFilter {
                read: args.iter().any(|a| a == "--unread").then_some(false),
            };
            print_json(&state.alert_api.list_alerts(filter)?)
        }
        "vehicles" => print_json(&state.fleet_api.list_vehicles()?),
        "vehicle" => {
            let id = parse_id(args.get(1))?;
            print_json(&state.fleet_api.get_vehicle_detail(id)?)
        }
        "diagnostic" => {
            let id = parse_id(args.get(1))?;
            print_json(&state.alert_api.get_diagnostic(id)?)
        }
        "dashboard" => print_json(&state.report_api.dashboard_stats(today)?),
        "costs" => print_json(&state.report_api.cost_report()?),
        "config" => {
            println!("{}", state.config_api.get_config_snapshot()?);
            Ok(())
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("日期格式应为 YYYY-MM-DD: {}", raw))
}

fn parse_id(raw: Option<&String>) -> anyhow::Result<i64> {
    let raw = raw.context("缺少 id 参数")?;
    raw.trim()
        .parse()
        .with_context(|| format!("id 应为整数: {}", raw))
}
