//! Fixtures shared by the integration tests.
#![allow(dead_code, unsafe_code)]

use std::ffi::CStr;

use scs_bridge::{
    ConicSolver, DenseArray, FloatWidth, HostStruct, HostValue, IndexWidth, SparseArray,
};
use scs_abi::{ScsCone, ScsData, ScsInfo, ScsSettings, ScsSolution};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Host arrays for a problem with a diagonal `A = sign * I` of size `dim`.
pub struct Diagonal {
    pub col_ptrs: Vec<usize>,
    pub rows: Vec<usize>,
    pub values: Vec<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
}

impl Diagonal {
    pub fn new(dim: usize, sign: f64, b: f64, c: f64) -> Self {
        Self {
            col_ptrs: (0..=dim).collect(),
            rows: (0..dim).collect(),
            values: vec![sign; dim],
            b: vec![b; dim],
            c: vec![c; dim],
        }
    }

    pub fn a(&self) -> HostValue<'_> {
        let dim = self.b.len();
        SparseArray::new(dim, dim, &self.col_ptrs, &self.rows, &self.values)
            .unwrap()
            .into()
    }

    pub fn data(&self) -> HostStruct<'_> {
        HostStruct::new()
            .with_field("A", self.a())
            .with_field("b", DenseArray::column(&self.b).into())
            .with_field("c", DenseArray::column(&self.c).into())
    }
}

pub fn scalar(value: &f64) -> HostValue<'_> {
    DenseArray::column(std::slice::from_ref(value)).into()
}

/// What the engine saw on its one call.
#[derive(Debug, Clone, Default)]
pub struct Seen {
    pub m: i64,
    pub n: i64,
    pub a_values: usize,
    pub a_rows: usize,
    pub a_cols: usize,
    pub b: usize,
    pub c: usize,
    pub p_null: bool,
    pub l: i64,
    pub bsize: i64,
    pub warm_start: i64,
    pub max_iters: i64,
    pub x_in: Vec<f64>,
    pub y_in: Vec<f64>,
    pub log_csv_filename: Option<String>,
}

/// Engine stand-in that records its inputs and writes a recognisable
/// solution: `x[i] = i + 1`, `y` and `s` all `-1`. Returns `exit_code`
/// when set, `1` otherwise.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: usize,
    pub seen: Seen,
    pub exit_code: Option<i64>,
}

impl<I: IndexWidth, F: FloatWidth> ConicSolver<I, F> for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    unsafe fn solve(
        &mut self,
        data: &ScsData<I, F>,
        cone: &ScsCone<I, F>,
        settings: &ScsSettings<I, F>,
        solution: &mut ScsSolution<F>,
        info: &mut ScsInfo<I, F>,
    ) -> I {
        self.calls += 1;
        let m = data.m.to_usize().unwrap();
        let n = data.n.to_usize().unwrap();
        // SAFETY: the bridge guarantees valid records for the call.
        unsafe {
            let a = &*data.a;
            let x = std::slice::from_raw_parts_mut(solution.x, n);
            let y = std::slice::from_raw_parts_mut(solution.y, m);
            let s = std::slice::from_raw_parts_mut(solution.s, m);
            self.seen = Seen {
                m: data.m.to_i64(),
                n: data.n.to_i64(),
                a_values: a.x as usize,
                a_rows: a.i as usize,
                a_cols: a.p as usize,
                b: data.b as usize,
                c: data.c as usize,
                p_null: data.p.is_null(),
                l: cone.l.to_i64(),
                bsize: cone.bsize.to_i64(),
                warm_start: settings.warm_start.to_i64(),
                max_iters: settings.max_iters.to_i64(),
                x_in: x.iter().map(|v| v.to_f64()).collect(),
                y_in: y.iter().map(|v| v.to_f64()).collect(),
                log_csv_filename: (!settings.log_csv_filename.is_null()).then(|| {
                    CStr::from_ptr(settings.log_csv_filename)
                        .to_string_lossy()
                        .into_owned()
                }),
            };
            for (i, slot) in x.iter_mut().enumerate() {
                *slot = F::from_f64(i as f64 + 1.0);
            }
            y.fill(F::from_f64(-1.0));
            s.fill(F::from_f64(-1.0));
        }
        info.iter = I::from_usize(7);
        info.status_val = I::from_i64(1);
        info.set_status_text("solved");
        info.setup_time = F::from_f64(0.5);
        info.solve_time = F::from_f64(1.25);
        I::from_i64(self.exit_code.unwrap_or(1))
    }
}
