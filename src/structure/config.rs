/* ************************************************************************ **
** This file is part of primgrid, and is licensed under EITHER the MIT      **
** license or the Apache 2.0 license, at your option.                       **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

#![allow(non_snake_case)]

//! Tolerances and knobs shared by the grid and the permutation builder.
//!
//! The functions here make use of serde_ignored to catch typos in the config.

use std::io::Read;

use serde::{Deserialize, Serialize};

/// Provides an alternative to `serde_yaml::from_reader` that warns about unused keys.
pub trait YamlRead: for<'de> Deserialize<'de> {
    fn from_reader(mut r: impl Read) -> Result<Self, serde_yaml::Error>
    { YamlRead::from_dyn_reader(&mut r) }

    fn from_dyn_reader(r: &mut dyn Read) -> Result<Self, serde_yaml::Error> {
        // serde_ignored needs a Deserializer.
        // unlike serde_json, serde_yaml doesn't seem to expose a Deserializer that is
        // directly constructable from a Read... but it does impl Deserialize for Value.
        Self::from_value(value_from_dyn_reader(r)?)
    }

    fn from_str(s: &str) -> Result<Self, serde_yaml::Error>
    { Self::from_value(serde_yaml::from_str(s)?) }

    fn from_value(value: serde_yaml::Value) -> Result<Self, serde_yaml::Error>;
}

macro_rules! derive_yaml_read {
    ($Type:ty) => {
        impl YamlRead for $Type {
            fn from_value(value: serde_yaml::Value) -> Result<$Type, serde_yaml::Error> {
                serde_ignored::deserialize(
                    value,
                    |path| warn!("Unused config item (possible typo?): {}", path),
                )
            }
        }
    };
}

fn value_from_dyn_reader(r: &mut dyn Read) -> Result<serde_yaml::Value, serde_yaml::Error>
{ serde_yaml::from_reader(r) }

fn from_empty_mapping<T: for<'de> Deserialize<'de>>() -> Result<T, serde_yaml::Error>
{ serde_yaml::from_value(serde_yaml::Value::Mapping(Default::default())) }

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GridSettings {
    /// Maximum distance from an integer allowed when rounding the
    /// primitive-to-supercell matrix, or a rotation in fractional
    /// coordinates, to integers.
    #[serde(default = "_grid_settings__int_tol")]
    pub int_tol: f64,

    /// Added to fractional coordinates before flooring them to a cell,
    /// so that points sitting on a cell boundary land in the upper cell.
    #[serde(default = "_grid_settings__floor_tol")]
    pub floor_tol: f64,

    /// Cartesian distance within which two sites are considered the same.
    #[serde(default = "_grid_settings__position_tol")]
    pub position_tol: f64,

    #[serde(default)]
    pub threading: Threading,
}
fn _grid_settings__int_tol() -> f64 { 1e-4 }
fn _grid_settings__floor_tol() -> f64 { 1e-5 }
fn _grid_settings__position_tol() -> f64 { 1e-4 }
derive_yaml_read!{GridSettings}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Threading {
    /// Build the permutations for each symmetry operation in parallel.
    ///
    /// Without the `rayon` feature this behaves like `Serial`.
    Rayon,

    /// Everything runs on the calling thread.
    Serial,
}

// --------------------------------------------------------

impl Default for Threading {
    fn default() -> Self { Threading::Rayon }
}

impl Default for GridSettings {
    fn default() -> Self {
        from_empty_mapping().unwrap_or_else(|e| panic!("(BUG) bad defaults: {}", e))
    }
}
