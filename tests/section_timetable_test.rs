// ==========================================
// 班级周课表查询集成测试
// ==========================================
// 测试范围:
// 1. 网格形状随排课参数变化
// 2. 单元格内容与落库课表一致
// 3. 不存在的班级返回 NotFound
// 4. 课间休息行及其后节次的顺延
// ==========================================

mod helpers;

use helpers::api_test_helper::ApiTestEnv;
use helpers::test_data_builder::TimetableSeed;
use timetable_aps::api::ApiError;
use timetable_aps::config::config_keys;

#[test]
fn test_grid_cells_match_persisted_classes() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let mut seed = TimetableSeed::new(env.repo());
    seed.classroom("Room-101");
    seed.taught_offering("CS101", "CSE-A", "Dr. Rao", 3, 1);
    seed.taught_offering("MA201", "CSE-B", "Dr. Menon", 2, 1);
    let section_a = seed.section("CSE-A");

    assert!(env.api.solve().unwrap().0);

    let grid = env.api.section_timetable(section_a).expect("查询课表失败");
    assert_eq!(grid.section_name, "CSE-A");
    assert_eq!(grid.scheduled_count(), 4);

    let persisted = env.api.schedule_repo().list_by_section(section_a).unwrap();
    assert_eq!(persisted.len(), 4);
    for class in &persisted {
        let cell = grid
            .cell(class.day, class.period)
            .expect("落库课程应出现在网格中");
        assert_eq!(cell.subject_code, "CS101");
        assert_eq!(cell.faculty_name, "Dr. Rao");
        assert_eq!(cell.classroom_name, "Room-101");
        assert_eq!(cell.class_type, class.class_type);
    }
}

#[test]
fn test_grid_follows_configured_periods() {
    let env = ApiTestEnv::with_grid(5, 4).expect("无法创建测试环境");
    env.set_config(config_keys::DAY_START, "10:00").unwrap();
    env.set_config(config_keys::PERIOD_MINUTES, "50").unwrap();

    let mut seed = TimetableSeed::new(env.repo());
    seed.classroom("Room-101");
    seed.taught_offering("CS101", "CSE-A", "Dr. Rao", 3, 1);
    let section = seed.section("CSE-A");

    assert!(env.api.solve().unwrap().0);

    let grid = env.api.section_timetable(section).unwrap();
    assert_eq!(
        grid.day_labels,
        vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
    );
    assert_eq!(grid.rows.len(), 4);
    assert!(grid.rows.iter().all(|r| r.cells.len() == 5));
    assert_eq!(grid.rows[1].label, "Period 2");
    assert_eq!(grid.rows[1].start_time.format("%H:%M").to_string(), "10:50");
    assert_eq!(grid.rows[3].end_time.format("%H:%M").to_string(), "13:20");

    for class in env.scheduled() {
        assert!(class.day <= 5 && class.period <= 4);
        let row = &grid.rows[(class.period - 1) as usize];
        assert_eq!(class.start_time, row.start_time);
        assert_eq!(class.end_time, row.end_time);
    }
}

#[test]
fn test_lunch_break_row_and_shifted_period_times() {
    let env = ApiTestEnv::with_grid(2, 6).expect("无法创建测试环境");
    env.set_config(config_keys::BREAKS, r#"{"4": 60}"#).unwrap();

    let mut seed = TimetableSeed::new(env.repo());
    seed.classroom("Room-101");
    seed.taught_offering("CS101", "CSE-A", "Dr. Rao", 3, 1);
    let section = seed.section("CSE-A");

    assert!(env.api.solve().unwrap().0);

    let grid = env.api.section_timetable(section).unwrap();
    assert_eq!(grid.rows.len(), 7);
    let labels: Vec<&str> = grid.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels[3], "Period 4");
    assert_eq!(labels[4], "Lunch Break");
    assert_eq!(labels[5], "Period 5");

    // 09:00 起 4 × 45 分钟 → 12:00 午休 60 分钟 → 第 5 节 13:00 开始
    assert_eq!(grid.rows[4].start_time.format("%H:%M").to_string(), "12:00");
    assert_eq!(grid.rows[5].start_time.format("%H:%M").to_string(), "13:00");
    assert_eq!(grid.rows[5].end_time.format("%H:%M").to_string(), "13:45");
    assert_eq!(grid.scheduled_count(), 4);

    // 落库时间与网格一致（含休息后的顺延）
    for class in env.scheduled() {
        let row = grid
            .rows
            .iter()
            .find(|r| r.period == Some(class.period))
            .expect("节次行应存在");
        assert_eq!(class.start_time, row.start_time);
        assert_eq!(class.end_time, row.end_time);
    }
}

#[test]
fn test_all_section_timetables_cover_every_section() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let mut seed = TimetableSeed::new(env.repo());
    seed.classrooms(2);
    seed.taught_offering("CS101", "CSE-A", "Dr. Rao", 3, 1);
    seed.taught_offering("CS101", "CSE-B", "Dr. Rao", 3, 1);
    seed.section("CSE-C");

    assert!(env.api.solve().unwrap().0);

    let grids = env.api.all_section_timetables().unwrap();
    let summary: Vec<(&str, usize)> = grids
        .iter()
        .map(|g| (g.section_name.as_str(), g.scheduled_count()))
        .collect();
    assert_eq!(summary, vec![("CSE-A", 4), ("CSE-B", 4), ("CSE-C", 0)]);
}

#[test]
fn test_unknown_section_is_not_found() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    match env.api.section_timetable(404) {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("404")),
        other => panic!("expected NotFound, got {:?}", other.map(|g| g.section_id)),
    }
}
