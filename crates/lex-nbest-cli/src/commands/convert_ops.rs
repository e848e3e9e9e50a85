use std::fmt::Write as _;
use std::path::Path;
use std::process;

use serde::Serialize;

use lex_nbest::converter::{
    build_lattice, viterbi, BoundaryCheckMode, BoundaryPolicy, Candidate, DefaultCostFunction,
    ImmutableConverter, Lattice, NBestGenerator, RequestType, RolePolicy, Segmenter, Segments,
    UNREACHABLE,
};
use lex_nbest::dict::PosTable;
use lex_nbest::settings::settings;

use crate::loader::{load_conn, load_resources, parse_fw_range, parse_segments, Resources};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Paths of the text resources shared by every conversion command.
pub struct ResourceArgs<'a> {
    pub dict_file: &'a str,
    pub conn_file: &'a str,
    pub roles: Option<&'a str>,
    pub fw_range: Option<&'a str>,
    pub suppress: Option<&'a str>,
}

fn open(args: &ResourceArgs) -> Resources {
    let fw_range = args
        .fw_range
        .map(|s| die!(parse_fw_range(s), "Error: {}"));
    die!(
        load_resources(
            Path::new(args.dict_file),
            Path::new(args.conn_file),
            args.roles.map(Path::new),
            fw_range,
            args.suppress.map(Path::new),
        ),
        "Error loading resources: {}"
    )
}

fn request_type(prediction: bool) -> RequestType {
    if prediction {
        RequestType::Prediction
    } else {
        RequestType::Conversion
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        die!(serde_json::to_string_pretty(value), "Error encoding JSON: {}")
    );
}

pub fn convert_cmd(args: &ResourceArgs, reading: &str, prediction: bool, n: usize, json: bool) {
    let res = open(args);
    let mut segments = die!(parse_segments(reading), "Error: {}");
    segments.set_request_type(request_type(prediction));

    let cost_fn = DefaultCostFunction::new(Some(&res.conn));
    let policy = RolePolicy::new(&res.conn);
    let converter = ImmutableConverter::new(&res.dict, &cost_fn, &policy, res.filter.as_ref())
        .with_candidates_per_segment(n);
    die!(converter.convert(&mut segments), "Error converting: {}");

    if json {
        print_json(&segments);
    } else {
        print!("{}", format_segments(&segments));
    }
}

/// Enumerate the whole-key window directly, bypassing segmentation.
pub fn nbest_cmd(
    args: &ResourceArgs,
    reading: &str,
    mode: Option<&str>,
    prediction: bool,
    n: usize,
    json: bool,
) {
    let mode: BoundaryCheckMode = match mode {
        Some(m) => die!(m.parse::<BoundaryCheckMode>(), "Error: {}"),
        None => settings().nbest.default_mode(),
    };
    let res = open(args);
    let segments = die!(parse_segments(reading), "Error: {}");
    let key = segments.key();
    let Some(candidates) =
        whole_key_candidates(&res, &segments, mode, request_type(prediction), n)
    else {
        eprintln!("No path through {reading}");
        process::exit(1);
    };

    if json {
        print_json(&candidates);
    } else {
        println!("{key} ({mode})");
        for (i, c) in candidates.iter().enumerate() {
            print!("{}", format_candidate(i, c));
        }
    }
}

/// Up to `n` candidates spanning the whole reading, BOS to EOS.
/// `None` when no path reaches EOS.
pub fn whole_key_candidates(
    res: &Resources,
    segments: &Segments,
    mode: BoundaryCheckMode,
    request_type: RequestType,
    n: usize,
) -> Option<Vec<Candidate>> {
    let cost_fn = DefaultCostFunction::new(Some(&res.conn));
    let policy = RolePolicy::new(&res.conn);
    let mut lattice = build_lattice(&res.dict, segments);
    viterbi(&mut lattice, &cost_fn)?;

    let key = segments.key();
    let mut gen = NBestGenerator::new(
        &lattice,
        &cost_fn,
        Segmenter::new(&policy),
        res.filter.as_ref(),
    );
    gen.reset(lattice.bos(), lattice.eos(), mode);
    Some(gen.iter(&key, request_type).take(n).collect())
}

#[derive(Serialize)]
struct NodeView<'a> {
    begin: usize,
    end: usize,
    key: &'a str,
    value: &'a str,
    cost: i16,
    left_id: u16,
    right_id: u16,
    best_cost: Option<i64>,
    cost_to_end: Option<i64>,
    on_best_path: bool,
}

fn node_views(lattice: &Lattice) -> Vec<NodeView<'_>> {
    let best: Vec<_> = lattice.best_path().collect();
    let known = |c: i64| (c != UNREACHABLE).then_some(c);
    let mut views: Vec<NodeView> = lattice
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, n)| !n.is_sentinel())
        .map(|(id, n)| NodeView {
            begin: n.begin,
            end: n.end,
            key: &n.key,
            value: &n.value,
            cost: n.cost,
            left_id: n.left_id,
            right_id: n.right_id,
            best_cost: known(n.best_cost),
            cost_to_end: known(n.cost_to_end),
            on_best_path: best.contains(&id),
        })
        .collect();
    views.sort_by_key(|v| (v.begin, v.end));
    views
}

/// Dump every lattice node with its Viterbi fields.
pub fn lattice_cmd(args: &ResourceArgs, reading: &str, json: bool) {
    let res = open(args);
    let segments = die!(parse_segments(reading), "Error: {}");
    let cost_fn = DefaultCostFunction::new(Some(&res.conn));
    let mut lattice = build_lattice(&res.dict, &segments);
    let total = viterbi(&mut lattice, &cost_fn);

    let views = node_views(&lattice);
    if json {
        print_json(&views);
        return;
    }
    match total {
        Some(t) => println!(
            "{} chars, {} nodes, best cost {t}",
            lattice.char_count(),
            views.len()
        ),
        None => println!(
            "{} chars, {} nodes, no path",
            lattice.char_count(),
            views.len()
        ),
    }
    let fmt_cost = |c: Option<i64>| c.map_or_else(|| "-".to_string(), |c| c.to_string());
    for v in &views {
        println!(
            "{} {:>2}-{:<2} {}({}) cost={} ids={}/{} best={} to_end={}",
            if v.on_best_path { "*" } else { " " },
            v.begin,
            v.end,
            v.value,
            v.key,
            v.cost,
            v.left_id,
            v.right_id,
            fmt_cost(v.best_cost),
            fmt_cost(v.cost_to_end),
        );
    }
}

/// Show the roles of two class ids and whether a segment may split between them.
pub fn roles_cmd(
    conn_file: &str,
    roles: Option<&str>,
    fw_range: Option<&str>,
    left: u16,
    right: u16,
) {
    let fw_range = fw_range.map(|s| die!(parse_fw_range(s), "Error: {}"));
    let conn = die!(
        load_conn(Path::new(conn_file), roles.map(Path::new), fw_range),
        "Error loading connection matrix: {}"
    );
    let policy = RolePolicy::new(&conn);
    println!(
        "conn({left}, {right}) = {}  [{left} {} → {right} {}] boundary={}",
        conn.cost(left, right),
        conn.pos_role(left),
        conn.pos_role(right),
        policy.is_boundary(left, right),
    );
}

pub fn format_candidate(rank: usize, c: &Candidate) -> String {
    let mut out = format!(
        "  #{:>2}: {}({}) cost={} wcost={} structure={}",
        rank + 1,
        c.value,
        c.key,
        c.cost,
        c.wcost,
        c.structure_cost
    );
    if c.inner_segment_boundary.len() > 1 {
        let parts: Vec<String> = c
            .inner_segments()
            .map(|s| format!("{}/{}", s.value, s.content_value))
            .collect();
        let _ = write!(out, "  [{}]", parts.join(" | "));
    }
    out.push('\n');
    out
}

pub fn format_segments(segments: &Segments) -> String {
    let mut out = String::new();
    for seg in segments {
        let _ = writeln!(out, "{} ({:?})", seg.key(), seg.segment_type());
        for (i, c) in seg.candidates().iter().enumerate() {
            out.push_str(&format_candidate(i, c));
        }
    }
    out
}
