//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::process::Command;

use assert_cmd::prelude::*;

pub const FEB_2015: &str = "\
# Winter sessions
Date\t23/02/2015
Time\t21:00-23:30
Location\tCambridge, UK
Seeing\t2
Transparency\t3
Telescopes\tTal100RS
Target\tCons\tType\tPower\tNotes
M42\tOri\tNeb\t50x\tBright nebula
Jupiter\tCnc\tPlanet\t100x\tFour moons

Date\t24/02/2015
Time\t20:00
Location\tCambridge, UK
Seeing\t3
Transparency\t2
Telescopes\tTal100RS
Target\tCons\tType\tPower\tNotes
M42\tOri\tNeb\t50x\tFainter tonight
NGC2244\tMon\tOpn Cl\t30x\tRosette cluster
";

pub const JAN_2016: &str = "\
Date\t05/01/2016
Time\t22:00
Location\tMadingley
Darkness\t20.8
Target\tCons\tType\tPower\tNotes
Betelgeuse\tOri\tStar\t50x\tOrange
Ceres\tCet\tAsteroid\t90x\tFaint dot
";

/// A files location with two raw report files.
pub fn make_fixture() -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("raw_reports/2015_feb.tsv")
        .write_str(FEB_2015)
        .expect("write 2015");
    tmp.child("raw_reports/2016_jan.csv")
        .write_str(JAN_2016)
        .expect("write 2016");
    tmp
}

/// The binary, run inside `dir` so no stray config file is picked up.
pub fn skyj(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("skyj").expect("skyj binary");
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}
