use clap::Subcommand;
use curfew_core::{Config, GeoPoint, HomeLocation, PreferenceRepository, ProximitySampler};
use serde::Serialize;

use super::open_preferences;

#[derive(Subcommand)]
pub enum HomeAction {
    /// Set the home location
    Set {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Show the stored home location
    Show,
    /// Forget the home location
    Clear,
    /// Check whether a position counts as home
    Check {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

#[derive(Serialize)]
struct HomeView {
    latitude: f64,
    longitude: f64,
    lat_e6: i32,
    lon_e6: i32,
}

impl From<HomeLocation> for HomeView {
    fn from(home: HomeLocation) -> Self {
        Self {
            latitude: home.latitude(),
            longitude: home.longitude(),
            lat_e6: home.lat_e6,
            lon_e6: home.lon_e6,
        }
    }
}

pub fn run(action: HomeAction) -> Result<(), Box<dyn std::error::Error>> {
    let prefs = open_preferences()?;

    match action {
        HomeAction::Set {
            latitude,
            longitude,
        } => {
            let home = HomeLocation::from_degrees(latitude, longitude)?;
            prefs.save_home(Some(home))?;
            println!("{}", serde_json::to_string_pretty(&HomeView::from(home))?);
        }
        HomeAction::Show => match prefs.load_home() {
            Some(home) => println!("{}", serde_json::to_string_pretty(&HomeView::from(home))?),
            None => println!("null"),
        },
        HomeAction::Clear => {
            prefs.save_home(None)?;
            eprintln!("Home location cleared");
        }
        HomeAction::Check { lat, lon } => {
            let config = Config::load()?;
            let fix = GeoPoint::checked(lat, lon)?;
            let mut sampler = ProximitySampler::new(prefs.load_home(), config.location.home_radius_m);
            let reading = sampler.sample(Some(fix));
            let json = serde_json::json!({
                "status": sampler.status(),
                "distance_m": reading.map(|r| r.distance_m),
                "radius_m": sampler.radius_m(),
                "message": sampler.status_text(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
