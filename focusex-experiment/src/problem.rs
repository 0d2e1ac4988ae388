use std::fmt;

use rand::Rng;

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
        }
    }

    /// Only called on operands the generator produced, which never divide
    /// by zero.
    fn apply(&self, a: i64, b: i64) -> i64 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
            Operator::Div => a / b,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Mental-arithmetic item shown during the fatigue condition, either
/// `a op b` or `(a op b) op c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticProblem {
    left: i64,
    op: Operator,
    right: i64,
    outer: Option<(Operator, i64)>,
}

impl ArithmeticProblem {
    fn new(left: i64, op: Operator, right: i64, outer: Option<(Operator, i64)>) -> Self {
        Self {
            left,
            op,
            right,
            outer,
        }
    }

    /// Operands of the first step are drawn from 1..=10; half of the
    /// problems get a second step with an operand from 10..=99.
    ///
    /// Every division divides evenly. A first-step dividend is scaled up to
    /// a multiple of its divisor; a second-step divisor is instead replaced
    /// by a divisor of the bracketed value.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut left = rng.random_range(1..=10);
        let right = rng.random_range(1..=10);
        let op = Operator::random(rng);
        if op == Operator::Div {
            left *= right;
        }

        let outer = if rng.random_bool(0.5) {
            let op2 = Operator::random(rng);
            let mut operand = rng.random_range(10..=99);
            if op2 == Operator::Div {
                operand = divisor_of(op.apply(left, right), operand, rng);
            }
            Some((op2, operand))
        } else {
            None
        };

        Self::new(left, op, right, outer)
    }

    pub fn inner_value(&self) -> i64 {
        self.op.apply(self.left, self.right)
    }

    pub fn answer(&self) -> i64 {
        match self.outer {
            Some((op2, operand)) => op2.apply(self.inner_value(), operand),
            None => self.inner_value(),
        }
    }

    /// Every `(dividend, divisor)` pair the problem asks for.
    pub fn divisions(&self) -> Vec<(i64, i64)> {
        let mut pairs = Vec::new();
        if self.op == Operator::Div {
            pairs.push((self.left, self.right));
        }
        if let Some((Operator::Div, operand)) = self.outer {
            pairs.push((self.inner_value(), operand));
        }
        pairs
    }
}

/// A random divisor of `value`, avoiding 1 when a larger one exists.
/// Zero is divisible by anything, so `fallback` is kept as is.
fn divisor_of<R: Rng + ?Sized>(value: i64, fallback: i64, rng: &mut R) -> i64 {
    let magnitude = value.abs();
    if magnitude == 0 {
        return fallback;
    }
    let divisors: Vec<i64> = (2..=magnitude).filter(|d| magnitude % d == 0).collect();
    if divisors.is_empty() {
        1
    } else {
        divisors[rng.random_range(0..divisors.len())]
    }
}

impl fmt::Display for ArithmeticProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outer {
            Some((op2, operand)) => write!(
                f,
                "({} {} {}) {} {} = ?",
                self.left,
                self.op.symbol(),
                self.right,
                op2.symbol(),
                operand
            ),
            None => write!(f, "{} {} {} = ?", self.left, self.op.symbol(), self.right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_division_is_exact() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut divisions = 0;
        for _ in 0..10_000 {
            let problem = ArithmeticProblem::generate(&mut rng);
            for (dividend, divisor) in problem.divisions() {
                assert_ne!(divisor, 0, "{problem}");
                assert_eq!(dividend % divisor, 0, "{problem}");
                divisions += 1;
            }
        }
        assert!(divisions > 1_000);
    }

    #[test]
    fn generated_answers_evaluate_exactly() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..10_000 {
            let p = ArithmeticProblem::generate(&mut rng);
            let inner = p.inner_value();
            if p.op == Operator::Div {
                assert_eq!(inner * p.right, p.left, "{p}");
            }
            match p.outer {
                Some((Operator::Div, operand)) => assert_eq!(p.answer() * operand, inner, "{p}"),
                Some(_) => {}
                None => assert_eq!(p.answer(), inner),
            }
        }
    }

    #[test]
    fn operands_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let p = ArithmeticProblem::generate(&mut rng);
            assert!((1..=10).contains(&p.right));
            if p.op == Operator::Div {
                assert!((1..=100).contains(&p.left));
            } else {
                assert!((1..=10).contains(&p.left));
            }
            if let Some((op2, operand)) = p.outer {
                if op2 != Operator::Div {
                    assert!((10..=99).contains(&operand));
                }
            }
        }
    }

    #[test]
    fn renders_one_and_two_step_forms() {
        let single = ArithmeticProblem::new(12, Operator::Div, 4, None);
        assert_eq!(single.to_string(), "12 / 4 = ?");
        assert_eq!(single.answer(), 3);

        let double = ArithmeticProblem::new(3, Operator::Sub, 9, Some((Operator::Div, 2)));
        assert_eq!(double.to_string(), "(3 - 9) / 2 = ?");
        assert_eq!(double.answer(), -3);
        assert_eq!(double.divisions(), vec![(-6, 2)]);
    }

    #[test]
    fn divisor_of_zero_keeps_operand() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(divisor_of(0, 37, &mut rng), 37);
        assert_eq!(divisor_of(-1, 37, &mut rng), 1);
        assert_eq!(divisor_of(7, 37, &mut rng), 7);
    }

    #[test]
    fn both_forms_are_generated() {
        let mut rng = StdRng::seed_from_u64(3);
        let problems: Vec<_> = (0..200).map(|_| ArithmeticProblem::generate(&mut rng)).collect();
        assert!(problems.iter().any(|p| p.outer.is_some()));
        assert!(problems.iter().any(|p| p.outer.is_none()));
        assert!(problems.iter().all(|p| p.to_string().ends_with(" = ?")));
    }
}
