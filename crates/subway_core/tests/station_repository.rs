use rusqlite::Connection;
use subway_core::db::open_db_in_memory;
use subway_core::{
    Line, LineRepository, RepoError, SqliteLineRepository, SqliteStationRepository, Station,
    StationRepository,
};

#[test]
fn save_assigns_identity_and_find_by_name_reads_it_back() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStationRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Station::create("신길역").unwrap()).unwrap();
    assert!(saved.id().is_some());

    let loaded = repo.find_by_name("신길역").unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(repo.find_by_id(saved.id().unwrap()).unwrap(), Some(saved));
    assert!(repo.find_by_name("없는역").unwrap().is_none());
}

#[test]
fn duplicate_station_name_is_integrity_violation() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStationRepository::try_new(&conn).unwrap();

    repo.save(&Station::create("잠실역").unwrap()).unwrap();
    let err = repo.save(&Station::create(" 잠실역 ").unwrap()).unwrap_err();

    assert!(err.is_integrity_violation());
    assert!(matches!(err, RepoError::DuplicateName { entity: "station", .. }));
    assert_eq!(repo.find_all().unwrap().len(), 1);
}

#[test]
fn renamed_station_is_visible_through_its_lines() {
    let conn = open_db_in_memory().unwrap();
    let stations = SqliteStationRepository::try_new(&conn).unwrap();
    let lines = SqliteLineRepository::try_new(&conn).unwrap();

    let mut station = stations.save(&Station::create("신촌역").unwrap()).unwrap();
    let mut line = Line::create("2호선", "GREEN").unwrap();
    line.add_line_station(&station, None, None).unwrap();
    lines.save(&line).unwrap();

    station.update_name("신촌(연세대)역").unwrap();
    stations.save(&station).unwrap();

    let line = lines.find_by_name("2호선").unwrap().unwrap();
    assert!(line.contains_station("신촌(연세대)역"));
    assert!(!line.contains_station("신촌역"));
}

#[test]
fn find_all_lists_stations_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStationRepository::try_new(&conn).unwrap();

    for name in ["신길역", "신도림역", "잠실역"] {
        repo.save(&Station::create(name).unwrap()).unwrap();
    }

    let names: Vec<_> = repo
        .find_all()
        .unwrap()
        .iter()
        .map(|station| station.name().to_string())
        .collect();
    assert_eq!(names, vec!["신길역", "신도림역", "잠실역"]);
}

#[test]
fn referenced_station_cannot_be_deleted_until_line_is_gone() {
    let conn = open_db_in_memory().unwrap();
    let stations = SqliteStationRepository::try_new(&conn).unwrap();
    let lines = SqliteLineRepository::try_new(&conn).unwrap();

    let first = stations.save(&Station::create("서울역").unwrap()).unwrap();
    let second = stations.save(&Station::create("시청역").unwrap()).unwrap();
    let mut line = Line::create("1호선", "BLUE").unwrap();
    line.add_line_station(&first, None, None).unwrap();
    line.add_line_station(&second, Some(&first), Some(2)).unwrap();
    let line = lines.save(&line).unwrap();

    let err = stations.delete(&first).unwrap_err();
    assert!(matches!(err, RepoError::ReferenceViolation { entity: "station", .. }));

    lines.delete(&line).unwrap();
    stations.delete(&first).unwrap();
    assert!(stations.find_by_name("서울역").unwrap().is_none());
}

#[test]
fn delete_of_transient_station_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStationRepository::try_new(&conn).unwrap();

    let transient = Station::create("을지로입구역").unwrap();
    assert!(matches!(
        repo.delete(&transient),
        Err(RepoError::Transient("station"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE stations (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL UNIQUE
        );",
    )
    .unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        subway_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteStationRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "stations",
            column: "created_at"
        })
    ));
}
