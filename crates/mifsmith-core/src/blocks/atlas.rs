//! Atlases: named regions of space, optionally split into sub-regions.

use indexmap::IndexSet;
use serde::Deserialize;

use super::{Keyword, PointArg, Specify, Viewplane, extent_from, extent_lines, point_args, require, require_list};
use crate::draft::Draft;
use crate::error::Fault;
use crate::format::{column_width, format_number, range};
use crate::geometry::{Axis, Extent};
use crate::registry::Entity;

/// Decimals used for the optional ranges of a multi-atlas.
const MULTI_ATLAS_DIGITS: usize = 4;

/// An axis-aligned box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoxAtlas {
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
}

impl Specify for BoxAtlas {
    fn class(&self) -> &'static str {
        "Oxs_BoxAtlas"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let extent = extent_from(&self.xrange, &self.yrange, &self.zrange)?;
        extent_lines(d, &extent);
        d.register(Entity::Atlas {
            extent,
            regions: IndexSet::new(),
        });
        Ok(())
    }
}

/// The ellipsoid inscribed in an axis-aligned box.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EllipsoidAtlas {
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
}

impl Specify for EllipsoidAtlas {
    fn class(&self) -> &'static str {
        "Oxs_EllipsoidAtlas"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let extent = extent_from(&self.xrange, &self.yrange, &self.zrange)?;
        extent_lines(d, &extent);
        d.register(Entity::Atlas {
            extent,
            regions: IndexSet::new(),
        });
        Ok(())
    }
}

/// Regions taken from the colors of a bitmap.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageAtlas {
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub viewplane: Option<Viewplane>,
    pub image: Option<String>,
    /// `(color, region)` pairs.
    pub colormap: Vec<(String, String)>,
    pub matcherror: Option<f64>,
}

impl Specify for ImageAtlas {
    fn class(&self) -> &'static str {
        "Oxs_ImageAtlas"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let extent = extent_from(&self.xrange, &self.yrange, &self.zrange)?;
        let viewplane = require("viewplane", &self.viewplane)?;
        let image = require("image", &self.image)?.replace('\\', "/");
        let colormap = require_list("colormap", &self.colormap)?;

        extent_lines(d, &extent);
        d.line(format!("viewplane {}", viewplane.as_str()));
        d.line(format!("image {image}"));
        d.line("colormap {");
        let width = column_width(colormap.iter().map(|(color, _)| color.as_str()));
        for (color, region) in colormap {
            d.indented(2, format!("{color:<width$} {region}"));
        }
        d.line("}");
        d.line(format!("matcherror {}", format_number(self.matcherror.unwrap_or(3.0))));

        d.reference_file(&image);
        d.register(Entity::Atlas {
            extent,
            regions: colormap.iter().map(|(_, region)| region.clone()).collect(),
        });
        Ok(())
    }
}

/// Regions assigned point by point by a script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptAtlas {
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
    pub regions: Vec<String>,
    pub script: Option<String>,
    pub script_args: Option<Vec<PointArg>>,
}

impl Specify for ScriptAtlas {
    fn class(&self) -> &'static str {
        "Oxs_ScriptAtlas"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let extent = extent_from(&self.xrange, &self.yrange, &self.zrange)?;
        let script = require("script", &self.script)?;
        let regions = require_list("regions", &self.regions)?;
        d.script("script", script)?;

        extent_lines(d, &extent);
        d.line(format!("regions {{ {} }}", regions.join(" ")));
        point_args(d, &self.script_args, None)?;
        d.line(format!("script {script}"));

        d.register(Entity::Atlas {
            extent,
            regions: regions.iter().cloned().collect(),
        });
        Ok(())
    }
}

/// A union of previously declared atlases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MultiAtlas {
    pub atlases: Vec<String>,
    pub xrange: Option<(f64, f64)>,
    pub yrange: Option<(f64, f64)>,
    pub zrange: Option<(f64, f64)>,
}

impl Specify for MultiAtlas {
    fn class(&self) -> &'static str {
        "Oxs_MultiAtlas"
    }

    fn draft(&self, d: &mut Draft<'_>) -> Result<(), Fault> {
        let members = require_list("atlases", &self.atlases)?;

        let mut union: Option<Extent> = None;
        let mut regions = IndexSet::new();
        for member in members {
            let (extent, sub) = d.atlas("atlases", member)?;
            union = Some(union.map_or(extent, |u| u.union(&extent)));
            regions.insert(member.clone());
            regions.extend(sub.iter().cloned());
            d.line(format!("atlas {member}"));
        }
        let union = union.ok_or_else(|| Fault::missing("atlases"))?;

        let given = [self.xrange, self.yrange, self.zrange];
        let mut bounds = [(0.0, 0.0); 3];
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            bounds[i] = match given[i] {
                Some((min, max)) => {
                    d.line(format!("{axis}range {}", range(min, max, MULTI_ATLAS_DIGITS)));
                    (min, max)
                }
                None => union.range(axis),
            };
        }
        let extent = Extent::checked(bounds[0], bounds[1], bounds[2])?;

        d.register(Entity::Atlas { extent, regions });
        Ok(())
    }
}
