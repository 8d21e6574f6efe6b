use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use svodka_rs::models::{
    ChartConfig, ChartKind, NumberFormat, PrimaryMetadata, TreeQuery, WidgetDraft, Window,
};
use svodka_rs::{Client, chart, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "svodka",
    version,
    about = "Fetch, shape, visualize & save statistical report widgets"
)]
struct Cli {
    /// Reporting gateway base URL.
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    base_url: String,
    /// Session user id, sent as the `user_id` cookie.
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch report rows (and optionally save, plot, or print them).
    Fetch(FetchArgs),
    /// Render a saved widget to an SVG chart.
    Render(RenderArgs),
    /// List or delete saved widgets.
    #[command(subcommand)]
    Widgets(WidgetsCmd),
    /// Manage widget folders.
    #[command(subcommand)]
    Folders(FoldersCmd),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Line,
    Bar,
    Pie,
    Doughnut,
}

impl From<KindArg> for ChartKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Line => ChartKind::Line,
            KindArg::Bar => ChartKind::Bar,
            KindArg::Pie => ChartKind::Pie,
            KindArg::Doughnut => ChartKind::Doughnut,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WindowArg {
    #[value(name = "7")]
    Last7,
    #[value(name = "10")]
    Last10,
    All,
}

impl From<WindowArg> for Window {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Last7 => Window::Last7,
            WindowArg::Last10 => Window::Last10,
            WindowArg::All => Window::All,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    None,
    Thousands,
    Millions,
    Trillions,
}

impl From<FormatArg> for NumberFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::None => NumberFormat::None,
            FormatArg::Thousands => NumberFormat::Thousands,
            FormatArg::Millions => NumberFormat::Millions,
            FormatArg::Trillions => NumberFormat::Trillions,
        }
    }
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Indicator id (from `get_indicators`).
    #[arg(long)]
    index: i64,
    /// Period type id.
    #[arg(long)]
    period: i64,
    /// Comma-separated term ids, as the segment lookup returns them.
    #[arg(long)]
    terms: String,
    /// Term id to drill down by.
    #[arg(long)]
    term: i64,
    /// Comma-separated dictionary ids.
    #[arg(long)]
    dics: String,
    /// Segment index.
    #[arg(long, default_value_t = 0)]
    idx: i64,
    /// Measure id.
    #[arg(long, default_value_t = 1)]
    measure: i64,
    /// Parent element id; empty fetches the top level.
    #[arg(long, default_value = "")]
    parent: String,
    /// Save rows to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Save the shaped chart payload as JSON.
    #[arg(long)]
    payload: Option<PathBuf>,
    /// Create an SVG chart at the given path.
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Chart kind for --plot, --payload, and --save (default line).
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    /// How many recent columns to keep: 7, 10 or all (default 7).
    #[arg(long, value_enum)]
    window: Option<WindowArg>,
    /// Number display format (default none).
    #[arg(long, value_enum)]
    number_format: Option<FormatArg>,
    /// Year for pie/doughnut aggregation (defaults to the most recent).
    #[arg(long)]
    year: Option<String>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Print the shaped table to stdout.
    #[arg(long, default_value_t = false)]
    table: bool,
    /// Save the fetched rows as a widget on the gateway.
    #[arg(long, default_value_t = false)]
    save: bool,
    /// Folder for --save; 0 is the root folder.
    #[arg(long, default_value_t = 0)]
    folder: i64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Saved widget id.
    #[arg(long)]
    id: i64,
    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,
    /// How many recent columns to keep: 7, 10 or all (default 7).
    #[arg(long, value_enum)]
    window: Option<WindowArg>,
    /// Number display format (default none).
    #[arg(long, value_enum)]
    number_format: Option<FormatArg>,
    /// Year for pie/doughnut aggregation (defaults to the most recent).
    #[arg(long)]
    year: Option<String>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Subcommand, Debug)]
enum WidgetsCmd {
    /// List saved widgets.
    List(WidgetsListArgs),
    /// Delete a widget by id.
    Delete(WidgetIdArgs),
}

#[derive(Args, Debug)]
struct WidgetsListArgs {
    /// Only widgets filed under this folder.
    #[arg(long)]
    folder: Option<i64>,
}

#[derive(Args, Debug)]
struct WidgetIdArgs {
    #[arg(long)]
    id: i64,
}

#[derive(Subcommand, Debug)]
enum FoldersCmd {
    /// List folders.
    List,
    /// Create a folder.
    Add(FolderNameArgs),
    /// Rename a folder.
    Rename(FolderRenameArgs),
    /// Delete an empty folder.
    Delete(FolderIdArgs),
}

#[derive(Args, Debug)]
struct FolderNameArgs {
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct FolderRenameArgs {
    #[arg(long)]
    id: i64,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct FolderIdArgs {
    #[arg(long)]
    id: i64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut client = Client::new(cli.base_url);
    if let Some(user) = cli.user {
        client = client.with_user(user);
    }
    match cli.cmd {
        Command::Fetch(args) => cmd_fetch(&client, args),
        Command::Render(args) => cmd_render(&client, args),
        Command::Widgets(cmd) => cmd_widgets(&client, cmd),
        Command::Folders(cmd) => cmd_folders(&client, cmd),
    }
}

fn cmd_fetch(client: &Client, args: FetchArgs) -> Result<()> {
    let kind: ChartKind = args.kind.unwrap_or(KindArg::Line).into();
    let config = ChartConfig {
        window: args.window.unwrap_or(WindowArg::Last7).into(),
        number_format: args.number_format.unwrap_or(FormatArg::None).into(),
        selected_year: args.year.clone(),
    };

    let query = TreeQuery {
        measure_id: args.measure,
        index_id: args.index,
        period_id: args.period,
        terms: args.terms.clone(),
        term_id: args.term,
        dic_ids: args.dics.clone(),
        idx: args.idx,
        parent_id: args.parent.clone(),
    };
    let rows = client.tree_data(&query)?;

    let meta = if args.plot.is_some() || args.save {
        client.index_attributes(args.index, args.period)?
    } else {
        PrimaryMetadata::default()
    };

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => {
                let keys = chart::temporal_keys(&rows);
                let window = chart::window_keys(&keys, config.window);
                storage::save_table_csv(&rows, window, path)?;
            }
            "json" => storage::save_rows_json(&rows, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }

    if let Some(path) = args.payload.as_ref() {
        let payload = chart::shape(&rows, kind, &config)?;
        storage::save_payload_json(&payload, path)?;
        eprintln!("Saved chart payload to {}", path.display());
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let payload = chart::shape(&rows, kind, &config)?;
        let year = chart::effective_year(&rows, &config);
        let title = chart::chart_title(kind, &meta, year.as_deref());
        let unit = meta.measure_name.clone().unwrap_or_default();
        viz::render_chart(
            &payload,
            kind,
            plot_path,
            args.width,
            args.height,
            &title,
            &unit,
            config.number_format,
        )?;
        eprintln!("Wrote chart to {}", plot_path.display());
    }

    if args.save {
        let draft = WidgetDraft {
            index_id: args.index,
            period_id: args.period,
            terms: args.terms.clone(),
            term_id: args.term,
            dic_ids: args.dics.clone(),
            idx: args.idx,
            chart_type: kind,
            folder_id: args.folder,
            selected_data: serde_json::to_string(&rows)?,
            primary_data: serde_json::to_string(&meta)?,
        };
        let id = client.save_widget(&draft)?;
        eprintln!("Saved widget {}", id);
    }

    if args.table {
        let view = chart::table_view(&rows, &config);
        println!("{}", view.columns.join("\t"));
        for cells in &view.rows {
            println!("{}", cells.join("\t"));
        }
    }

    Ok(())
}

fn cmd_render(client: &Client, args: RenderArgs) -> Result<()> {
    let widgets = client.widgets(None)?;
    let widget = widgets
        .into_iter()
        .find(|w| w.id == args.id)
        .ok_or_else(|| anyhow::anyhow!("widget {} not found", args.id))?;

    let rows = widget.rows()?;
    let meta = widget.primary()?;
    let config = ChartConfig {
        window: args.window.unwrap_or(WindowArg::Last7).into(),
        number_format: args.number_format.unwrap_or(FormatArg::None).into(),
        selected_year: args.year.clone(),
    };

    let payload = chart::shape(&rows, widget.chart_type, &config)?;
    let year = chart::effective_year(&rows, &config);
    let title = chart::chart_title(widget.chart_type, &meta, year.as_deref());
    let unit = meta.measure_name.clone().unwrap_or_default();
    viz::render_chart(
        &payload,
        widget.chart_type,
        &args.out,
        args.width,
        args.height,
        &title,
        &unit,
        config.number_format,
    )?;
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_widgets(client: &Client, cmd: WidgetsCmd) -> Result<()> {
    match cmd {
        WidgetsCmd::List(args) => {
            for w in client.widgets(args.folder)? {
                let name = w.primary().ok().and_then(|m| m.name).unwrap_or_default();
                println!(
                    "{} • {}  folder={}  {}",
                    w.id,
                    w.chart_type.as_str(),
                    w.folder_id.unwrap_or(0),
                    name
                );
            }
            Ok(())
        }
        WidgetsCmd::Delete(args) => {
            client.delete_widget(args.id)?;
            eprintln!("Deleted widget {}", args.id);
            Ok(())
        }
    }
}

fn cmd_folders(client: &Client, cmd: FoldersCmd) -> Result<()> {
    match cmd {
        FoldersCmd::List => {
            for f in client.folders()? {
                println!("{} • {}", f.id, f.name);
            }
            Ok(())
        }
        FoldersCmd::Add(args) => {
            let f = client.add_folder(&args.name)?;
            eprintln!("Created folder {} ({})", f.name, f.id);
            Ok(())
        }
        FoldersCmd::Rename(args) => {
            let f = client.rename_folder(args.id, &args.name)?;
            eprintln!("Renamed folder {} to {}", args.id, f.name);
            Ok(())
        }
        FoldersCmd::Delete(args) => {
            client.delete_folder(args.id)?;
            eprintln!("Deleted folder {}", args.id);
            Ok(())
        }
    }
}
