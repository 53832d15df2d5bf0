//! Projects

use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{cart::NewCartLine, prices::Price};

new_key_type! {
    /// Project Key
    pub struct ProjectKey;
}

/// The ways a project can be bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    /// Source code, schematics and report, delivered as a download.
    Digital,

    /// Components shipped unassembled.
    HardwareKit,

    /// Assembled and tested project.
    FullBuild,
}

impl PackageType {
    /// Every package type, cheapest first.
    pub const ALL: [PackageType; 3] = [
        PackageType::Digital,
        PackageType::HardwareKit,
        PackageType::FullBuild,
    ];

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PackageType::Digital => "Digital",
            PackageType::HardwareKit => "Hardware Kit",
            PackageType::FullBuild => "Full Build",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Project
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Catalog identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Gallery image
    pub image_url: String,

    /// Price of each offered package
    pub packages: SmallVec<[(PackageType, Price); 3]>,
}

impl Project {
    /// Price of the given package, if the project offers it.
    #[must_use]
    pub fn price(&self, package: PackageType) -> Option<Price> {
        self.packages
            .iter()
            .find(|(offered, _)| *offered == package)
            .map(|(_, price)| *price)
    }

    /// Build the cart line for one unit of the given package.
    #[must_use]
    pub fn line(&self, package: PackageType) -> Option<NewCartLine> {
        let unit_price = self.price(package)?;

        Some(NewCartLine {
            project_id: self.id.clone(),
            package,
            unit_price,
            image_url: self.image_url.clone(),
            title: self.title.clone(),
        })
    }
}
