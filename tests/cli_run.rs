use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[cfg(unix)]
fn install_stub(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;

    // The query file is the fourth argument: -db DB -query QUERY ...
    let script = r#"#!/bin/sh
case "$4" in
    *subject.fa) echo "X,A,80,1e-50,90,480"
                 echo "Y,B,75,1e-40,85,420" ;;
    *) echo "A,X,80,1e-50,90,500"
       echo "A,Y,80,1e-50,90,300"
       echo "B,Y,75,1e-40,85,400" ;;
esac
"#;
    let path = dir.join("blastp");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
fn stub_path(dir: &Path) -> String {
    format!(
        "{}:{}",
        dir.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

#[cfg(unix)]
fn write_fixtures(dir: &Path) -> (String, String, String) {
    let query = dir.join("query1.fa");
    let subject = dir.join("subject.fa");
    let query_db = dir.join("querydb.fa");
    fs::write(&query, ">A\nMKVL\n>B\nMNPQ\n").unwrap();
    fs::write(&subject, ">X\nMTTA\n>Y\nMGGS\n").unwrap();
    fs::write(&query_db, ">A\nMKVL\n>B\nMNPQ\n").unwrap();
    (
        query.to_str().unwrap().to_string(),
        subject.to_str().unwrap().to_string(),
        query_db.to_str().unwrap().to_string(),
    )
}

#[cfg(unix)]
#[test]
fn command_run() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    install_stub(temp.path());
    let (query, subject, query_db) = write_fixtures(temp.path());
    let outdir = temp.path().join("out");

    let mut cmd = Command::cargo_bin("rbh")?;
    let output = cmd
        .env("PATH", stub_path(temp.path()))
        .arg("run")
        .arg(&query)
        .arg("-s")
        .arg(&subject)
        .arg("-r")
        .arg(&query_db)
        .arg("-o")
        .arg(&outdir)
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("ok"), "status summary");
    assert!(stdout.contains("2 pairs"), "pair count");

    // A<->X is mutual; B's forward best Y points back at B; A->Y loses to
    // A->X and never appears
    let report = fs::read_to_string(outdir.join("query1.rbh.csv"))?;
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(
        lines,
        vec!["A,X,80,1e-50,90,500", "B,Y,75,1e-40,85,400"]
    );

    Ok(())
}

#[cfg(unix)]
#[test]
fn command_run_batch_isolation() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    install_stub(temp.path());
    let (query, subject, query_db) = write_fixtures(temp.path());
    let outdir = temp.path().join("out");

    let query3 = temp.path().join("query3.fa");
    fs::copy(&query, &query3)?;
    let missing = temp.path().join("absent.fa");

    let mut cmd = Command::cargo_bin("rbh")?;
    let output = cmd
        .env("PATH", stub_path(temp.path()))
        .arg("run")
        .arg(&query)
        .arg(&missing)
        .arg(&query3)
        .arg("-s")
        .arg(&subject)
        .arg("-r")
        .arg(&query_db)
        .arg("-o")
        .arg(&outdir)
        .arg("-p")
        .arg("2")
        .output()?;

    // one failed file makes the whole run exit non-zero, but every file is
    // accounted for and the healthy ones still get reports
    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("missing or unreadable input"));
    assert!(outdir.join("query1.rbh.csv").is_file());
    assert!(outdir.join("query3.rbh.csv").is_file());

    Ok(())
}

#[cfg(unix)]
#[test]
fn command_run_engine_failure() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new()?;
    let (query, subject, query_db) = write_fixtures(temp.path());

    let path = temp.path().join("blastp");
    fs::write(&path, "#!/bin/sh\necho 'BLAST Database error' >&2\nexit 2\n")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;

    let mut cmd = Command::cargo_bin("rbh")?;
    let output = cmd
        .env("PATH", stub_path(temp.path()))
        .arg("run")
        .arg(&query)
        .arg("-s")
        .arg(&subject)
        .arg("-r")
        .arg(&query_db)
        .arg("-o")
        .arg(temp.path().join("out"))
        .output()?;

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("failed"));
    assert!(stdout.contains("BLAST Database error"));

    Ok(())
}

#[test]
fn command_run_missing_args() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("rbh")?;
    cmd.arg("run")
        .arg("query.fa")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--subject"));

    Ok(())
}
