//! Utils

use clap::Parser;

use crate::projects::PackageType;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to use for the catalog, coupons & config
    #[clap(short, long, env = "KITCART_FIXTURE", default_value = "kits")]
    pub fixture: String,

    /// Coupon code to apply
    #[clap(short, long)]
    pub coupon: Option<String>,

    /// Verify the shopper as a student
    #[clap(short, long)]
    pub student: bool,

    /// Redeem loyalty points
    #[clap(short, long)]
    pub points: bool,

    /// Units of each project to add
    #[clap(short, long, default_value_t = 1)]
    pub quantity: u32,

    /// Package to buy for every project
    #[clap(long, value_parser = parse_package, default_value = "HARDWARE_KIT")]
    pub package: PackageType,
}

/// Parse a package name as written in fixtures (e.g., `HARDWARE_KIT`), ignoring case.
///
/// # Errors
///
/// Returns the list of accepted names if `s` is not a package.
pub fn parse_package(s: &str) -> Result<PackageType, String> {
    let name = serde_json::Value::String(s.trim().to_ascii_uppercase());

    serde_json::from_value(name).map_err(|_err| {
        format!("unknown package {s}, expected DIGITAL, HARDWARE_KIT or FULL_BUILD")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_package_accepts_fixture_names() {
        assert_eq!(parse_package("HARDWARE_KIT"), Ok(PackageType::HardwareKit));
        assert_eq!(parse_package("digital"), Ok(PackageType::Digital));
        assert!(parse_package("box").is_err());
    }

    #[test]
    fn parse_package_accepts_every_serialized_name() -> Result<(), serde_json::Error> {
        for package in PackageType::ALL {
            let name = serde_json::to_string(&package)?;

            assert_eq!(parse_package(name.trim_matches('"')), Ok(package));
        }

        Ok(())
    }

    #[test]
    fn args_default_to_kits_fixture() -> Result<(), clap::Error> {
        let args = ExampleCartArgs::try_parse_from(["checkout", "--coupon", "SAVE500", "-s"])?;

        assert_eq!(args.fixture, "kits");
        assert_eq!(args.coupon.as_deref(), Some("SAVE500"));
        assert!(args.student);
        assert!(!args.points);
        assert_eq!(args.quantity, 1);
        assert_eq!(args.package, PackageType::HardwareKit);

        Ok(())
    }

    #[test]
    fn fixture_flag_overrides_default() -> Result<(), clap::Error> {
        let args = ExampleCartArgs::try_parse_from(["checkout", "-f", "gadgets"])?;

        assert_eq!(args.fixture, "gadgets");

        Ok(())
    }
}
