//! Serde data file structs for simulation descriptions.
//!
//! A description lists blocks in declaration order. Each block carries an
//! optional explicit name and its kind-specific options, keyed by the kind:
//!
//! ```ron
//! (
//!     target: "out/disk.mif",
//!     blocks: [
//!         (name: "Brick", spec: BoxAtlas(xrange: (0, 100e-9), yrange: (0, 100e-9), zrange: (0, 12e-9))),
//!         (spec: RectangularMesh(cellsize: (4e-9, 4e-9, 4e-9), atlas: "Brick")),
//!     ],
//! )
//! ```

use std::path::PathBuf;

use mifsmith_core::Specify;
use mifsmith_core::blocks::atlas::{BoxAtlas, EllipsoidAtlas, ImageAtlas, MultiAtlas, ScriptAtlas};
use mifsmith_core::blocks::driver::{MinDriver, TimeDriver};
use mifsmith_core::blocks::energy::{
    CubicAnisotropy, Demag, Exchange6Ngbr, ExchangePtwise, FixedZeeman, RandomSiteExchange, ScriptUZeeman,
    SimpleDemag, StageZeeman, TransformZeeman, UZeeman, UniaxialAnisotropy, UniformExchange,
};
use mifsmith_core::blocks::evolver::{CGEvolve, EulerEvolve, RungeKuttaEvolve, SpinTEvolve, SpinXferEvolve};
use mifsmith_core::blocks::mesh::RectangularMesh;
use mifsmith_core::blocks::output::{Destination, Schedule};
use mifsmith_core::blocks::scalar_field::{
    AffineOrientScalarField, AffineTransformScalarField, AtlasScalarField, ImageScalarField, LinearScalarField,
    RandomScalarField, ScriptOrientScalarField, ScriptScalarField, UniformScalarField, VecMagScalarField,
};
use mifsmith_core::blocks::script::Proc;
use mifsmith_core::blocks::vector_field::{
    AffineOrientVectorField, AtlasVectorField, FileVectorField, ImageVectorField, MaskVectorField,
    PlaneRandomVectorField, RandomVectorField, ScriptOrientVectorField, ScriptVectorField, UniformVectorField,
};
use serde::Deserialize;

/// A whole simulation description.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationData {
    /// Output file, relative to the description file.
    #[serde(default)]
    pub target: Option<PathBuf>,
    #[serde(default)]
    pub basename: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockData>,
}

/// One block of a description.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockData {
    /// Explicit name; auto-generated from the kind when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub spec: SpecData,
}

/// Every declarable block kind, keyed by kind name.
#[derive(Debug, Clone, Deserialize)]
pub enum SpecData {
    // Atlases
    BoxAtlas(BoxAtlas),
    EllipsoidAtlas(EllipsoidAtlas),
    ImageAtlas(ImageAtlas),
    ScriptAtlas(ScriptAtlas),
    MultiAtlas(MultiAtlas),

    RectangularMesh(RectangularMesh),

    // Energies
    UniaxialAnisotropy(UniaxialAnisotropy),
    CubicAnisotropy(CubicAnisotropy),
    Exchange6Ngbr(Exchange6Ngbr),
    UniformExchange(UniformExchange),
    ExchangePtwise(ExchangePtwise),
    RandomSiteExchange(RandomSiteExchange),
    Demag(Demag),
    SimpleDemag(SimpleDemag),
    UZeeman(UZeeman),
    FixedZeeman(FixedZeeman),
    ScriptUZeeman(ScriptUZeeman),
    TransformZeeman(TransformZeeman),
    StageZeeman(StageZeeman),

    // Evolvers
    EulerEvolve(EulerEvolve),
    RungeKuttaEvolve(RungeKuttaEvolve),
    SpinXferEvolve(SpinXferEvolve),
    SpinTEvolve(SpinTEvolve),
    CGEvolve(CGEvolve),

    // Drivers
    TimeDriver(TimeDriver),
    MinDriver(MinDriver),

    // Scalar fields
    UniformScalarField(UniformScalarField),
    AtlasScalarField(AtlasScalarField),
    LinearScalarField(LinearScalarField),
    RandomScalarField(RandomScalarField),
    ScriptScalarField(ScriptScalarField),
    VecMagScalarField(VecMagScalarField),
    ScriptOrientScalarField(ScriptOrientScalarField),
    AffineOrientScalarField(AffineOrientScalarField),
    AffineTransformScalarField(AffineTransformScalarField),
    ImageScalarField(ImageScalarField),

    // Vector fields
    UniformVectorField(UniformVectorField),
    AtlasVectorField(AtlasVectorField),
    ScriptVectorField(ScriptVectorField),
    FileVectorField(FileVectorField),
    RandomVectorField(RandomVectorField),
    PlaneRandomVectorField(PlaneRandomVectorField),
    ScriptOrientVectorField(ScriptOrientVectorField),
    AffineOrientVectorField(AffineOrientVectorField),
    MaskVectorField(MaskVectorField),
    ImageVectorField(ImageVectorField),

    Proc(Proc),

    // Output directives
    Destination(Destination),
    Schedule(Schedule),
}

impl SpecData {
    pub fn as_specify(&self) -> &dyn Specify {
        match self {
            SpecData::BoxAtlas(s) => s,
            SpecData::EllipsoidAtlas(s) => s,
            SpecData::ImageAtlas(s) => s,
            SpecData::ScriptAtlas(s) => s,
            SpecData::MultiAtlas(s) => s,
            SpecData::RectangularMesh(s) => s,
            SpecData::UniaxialAnisotropy(s) => s,
            SpecData::CubicAnisotropy(s) => s,
            SpecData::Exchange6Ngbr(s) => s,
            SpecData::UniformExchange(s) => s,
            SpecData::ExchangePtwise(s) => s,
            SpecData::RandomSiteExchange(s) => s,
            SpecData::Demag(s) => s,
            SpecData::SimpleDemag(s) => s,
            SpecData::UZeeman(s) => s,
            SpecData::FixedZeeman(s) => s,
            SpecData::ScriptUZeeman(s) => s,
            SpecData::TransformZeeman(s) => s,
            SpecData::StageZeeman(s) => s,
            SpecData::EulerEvolve(s) => s,
            SpecData::RungeKuttaEvolve(s) => s,
            SpecData::SpinXferEvolve(s) => s,
            SpecData::SpinTEvolve(s) => s,
            SpecData::CGEvolve(s) => s,
            SpecData::TimeDriver(s) => s,
            SpecData::MinDriver(s) => s,
            SpecData::UniformScalarField(s) => s,
            SpecData::AtlasScalarField(s) => s,
            SpecData::LinearScalarField(s) => s,
            SpecData::RandomScalarField(s) => s,
            SpecData::ScriptScalarField(s) => s,
            SpecData::VecMagScalarField(s) => s,
            SpecData::ScriptOrientScalarField(s) => s,
            SpecData::AffineOrientScalarField(s) => s,
            SpecData::AffineTransformScalarField(s) => s,
            SpecData::ImageScalarField(s) => s,
            SpecData::UniformVectorField(s) => s,
            SpecData::AtlasVectorField(s) => s,
            SpecData::ScriptVectorField(s) => s,
            SpecData::FileVectorField(s) => s,
            SpecData::RandomVectorField(s) => s,
            SpecData::PlaneRandomVectorField(s) => s,
            SpecData::ScriptOrientVectorField(s) => s,
            SpecData::AffineOrientVectorField(s) => s,
            SpecData::MaskVectorField(s) => s,
            SpecData::ImageVectorField(s) => s,
            SpecData::Proc(s) => s,
            SpecData::Destination(s) => s,
            SpecData::Schedule(s) => s,
        }
    }
}
