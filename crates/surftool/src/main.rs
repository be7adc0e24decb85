mod capture;
mod describe;
mod obj;

use bytesize::ByteSize;
use capture::{CaptureDrawModule, Captured};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{
    Cell, CellAlignment, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS,
    presets::UTF8_FULL,
};
use describe::{Description, Kind};
use eyre_pretty::{Context, Result, bail};
use gesurf::{
    DrawEngine, Submitted, basis,
    config::{Config, Quality},
    knots::{self, Boundary, KnotDivisors},
    modules::Modules,
    state::GpuState,
    vertex::{SimpleVertex, VertexType},
};
use std::{io::BufWriter, path::PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BasisKind {
    Bezier,
    Spline,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Tessellate a patch description
    Tessellate {
        /// Path to the .ron patch description
        #[arg(short, long)]
        input: PathBuf,
        /// Path to a .ron engine configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Tessellation quality, overrides the configuration
        #[arg(short, long)]
        quality: Option<Quality>,
        /// Path to write the tessellated mesh to, as a Wavefront .obj
        #[arg(long)]
        obj: Option<PathBuf>,
    },
    /// Print the basis functions of a single span at a given parameter
    Basis {
        #[arg(short, long, value_enum)]
        kind: BasisKind,
        /// Curve parameter. Spline parameters range over all spans.
        #[arg(short, long)]
        t: f32,
        /// Number of control points of the spline
        #[arg(long, default_value_t = 4)]
        count: usize,
        /// Whether the spline is clamped at its start
        #[arg(long, default_value_t = false)]
        open_start: bool,
        /// Whether the spline is clamped at its end
        #[arg(long, default_value_t = false)]
        open_end: bool,
    },
}

/// A CLI to tessellate and inspect PSP GE curved surfaces.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Action to take
    #[command(subcommand)]
    command: Command,
}

fn setup_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or(EnvFilter::new("surftool=info,gesurf=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn attributes(vertex_type: VertexType) -> String {
    let present = [
        (vertex_type.has_tex_coords(), "uv"),
        (vertex_type.has_color(), "color"),
        (vertex_type.has_normal(), "normal"),
    ];

    present
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .chain(["position"])
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary_table(
    description: &Description,
    vertex_type: VertexType,
    config: &Config,
    submitted: &Submitted,
) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Property").set_alignment(CellAlignment::Center),
            Cell::new("Value").set_alignment(CellAlignment::Center),
        ]);

    let kind = match description.kind {
        Kind::Bezier => "Bezier".to_owned(),
        Kind::Spline {
            boundary_u,
            boundary_v,
        } => format!(
            "Spline (u: {:02b}, v: {:02b})",
            boundary_u.to_bits(),
            boundary_v.to_bits()
        ),
    };

    let mesh_size = submitted.vertex_count * size_of::<SimpleVertex>()
        + submitted.index_count * size_of::<u16>();

    let rows = [
        ("Kind", kind),
        (
            "Control points",
            format!("{}x{}", description.count_u, description.count_v),
        ),
        (
            "Tessellation",
            format!("{}x{}", description.tess_u, description.tess_v),
        ),
        ("Attributes", attributes(vertex_type)),
        ("Primitive", description.primitive.to_string()),
        ("Quality", config.quality.to_string()),
        (
            "Bytes read",
            format!("{}", ByteSize(submitted.bytes_read as u64).display()),
        ),
        ("Vertices", submitted.vertex_count.to_string()),
        ("Indices", submitted.index_count.to_string()),
        (
            "Mesh size",
            format!("{}", ByteSize(mesh_size as u64).display()),
        ),
    ];

    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

fn tessellate(
    input: PathBuf,
    config: Option<PathBuf>,
    quality: Option<Quality>,
    obj: Option<PathBuf>,
) -> Result<()> {
    let description = std::fs::read_to_string(&input).context("reading patch description")?;
    let description: Description =
        ron::from_str(&description).context("parsing patch description")?;

    let mut config = match config {
        Some(path) => {
            let config = std::fs::read_to_string(&path).context("reading configuration")?;
            ron::from_str(&config).context("parsing configuration")?
        }
        None => Config::default(),
    };

    if let Some(quality) = quality {
        config.quality = quality;
    }

    let encoded = description.encode()?;
    let data = encoded.patch_data(&description);

    let captured = Captured::default();
    let modules = Modules {
        draw: Box::new(CaptureDrawModule::new(captured.clone())),
        ..Default::default()
    };

    let mut engine = DrawEngine::new(config.clone(), modules);
    let mut state = GpuState {
        material_color: description.material_color(),
        ..Default::default()
    };

    let submitted = match description.kind {
        Kind::Bezier => engine.submit_bezier(&mut state, &data),
        Kind::Spline {
            boundary_u,
            boundary_v,
        } => engine.submit_spline(&mut state, &data, boundary_u, boundary_v),
    }
    .context("tessellating patch")?;

    summary_table(&description, encoded.vertex_type, &config, &submitted);

    if let Some(obj) = obj {
        let meshes = captured.take();
        let output = BufWriter::new(std::fs::File::create(&obj).context("opening output file")?);
        obj::write(output, &meshes).context("writing .obj")?;

        tracing::info!("wrote {} meshes to {}", meshes.len(), obj.display());
    }

    Ok(())
}

fn basis_table(names: impl IntoIterator<Item = String>, weights: [f32; 4], derivatives: [f32; 4]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Basis").set_alignment(CellAlignment::Center),
            Cell::new("Weight").set_alignment(CellAlignment::Center),
            Cell::new("Derivative").set_alignment(CellAlignment::Center),
        ]);

    for ((name, weight), derivative) in names.into_iter().zip(weights).zip(derivatives) {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{weight:.6}")).set_alignment(CellAlignment::Right),
            Cell::new(format!("{derivative:.6}")).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("{table}");
}

fn print_basis(kind: BasisKind, t: f32, count: usize, boundary: Boundary) -> Result<()> {
    match kind {
        BasisKind::Bezier => {
            if !(0.0..=1.0).contains(&t) {
                bail!("bezier parameter must be in [0, 1]");
            }

            let weights = [basis::bern0(t), basis::bern1(t), basis::bern2(t), basis::bern3(t)];
            let derivatives = [
                basis::bern0_deriv(t),
                basis::bern1_deriv(t),
                basis::bern2_deriv(t),
                basis::bern3_deriv(t),
            ];

            basis_table((0..4).map(|i| format!("B{i}")), weights, derivatives);
        }
        BasisKind::Spline => {
            let spans = knots::span_count(count);
            if spans == 0 {
                bail!("a spline needs at least 4 control points");
            }

            if !(0.0..=spans as f32).contains(&t) {
                bail!("spline parameter must be in [0, {spans}]");
            }

            let mut knots = vec![0.0; spans + 2];
            let mut divs = vec![KnotDivisors::default(); spans];
            knots::build(boundary, &mut knots, &mut divs);

            let span = (t as usize).min(spans - 1);
            let basis = basis::spline_n_4(span, t, &knots, &divs[span]);

            basis_table(
                (span..span + 4).map(|i| format!("N{i}")),
                basis.weights,
                basis.derivatives,
            );
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    eyre_pretty::install()?;
    setup_tracing();

    let args = Args::parse();
    match args.command {
        Command::Tessellate {
            input,
            config,
            quality,
            obj,
        } => tessellate(input, config, quality, obj),
        Command::Basis {
            kind,
            t,
            count,
            open_start,
            open_end,
        } => print_basis(
            kind,
            t,
            count,
            Boundary {
                start_open: open_start,
                end_open: open_end,
            },
        ),
    }
}
