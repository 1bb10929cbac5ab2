//! Internal testing utilities for the bagshape crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Runs table-driven tests.
///
/// Shape inference tests usually check one rule against many input shapes.
/// Rather than stopping at the first failing shape, `TestCases` runs every
/// case, catching panics, and then reports all of the failures together.
///
/// Cases are conventionally a local `Case` struct which derives `Debug`, so
/// that failures can be printed.
///
/// ```
/// use bagshape_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     dims: Vec<usize>,
///     rank: usize,
/// }
///
/// let cases = [
///     Case { dims: vec![1000, 64], rank: 2 },
///     Case { dims: vec![7], rank: 1 },
/// ];
///
/// cases.test_each(|case| {
///     assert_eq!(case.dims.len(), case.rank);
/// });
/// ```
///
/// Cases and the test function must be
/// [unwind safe](https://doc.rust-lang.org/std/panic/fn.catch_unwind.html).
/// If a case holds a value that is not, either describe how to build the
/// value and build it inside the test function, or wrap it in
/// [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case, catching any panics.
    ///
    /// Panics after all cases have run if any of them failed, with the
    /// count and debug representations of the failed cases.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Variant of [`test_each`](TestCases::test_each) which passes each case
    /// by value.
    ///
    /// This suits tests which mutate the case, such as running inference on a
    /// node and then inspecting the node's output. Each case is formatted
    /// before the test runs so it can still be reported on failure.
    fn test_each_value(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let failures: Vec<String> = self
            .into_iter()
            .filter_map(|case| {
                std::panic::catch_unwind(|| test(&case))
                    .is_err()
                    .then(|| format!("{:?}", case))
            })
            .collect();
        report_failures(&failures);
    }

    fn test_each_value(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<String> = self
            .into_iter()
            .filter_map(|case| {
                let case_str = format!("{:?}", case);
                std::panic::catch_unwind(move || test(case))
                    .is_err()
                    .then_some(case_str)
            })
            .collect();
        report_failures(&failures);
    }
}

fn report_failures(failures: &[String]) {
    assert_eq!(
        failures.len(),
        0,
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}
