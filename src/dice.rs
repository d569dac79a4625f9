//! Dice expressions for weapon characteristics.
//!
//! Attacks and Damage are either fixed (`3`) or random (`D6`, `2D3+1`).
//! The engine never rolls them; it only needs their average.

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A dice expression of the form `[count]D<sides>[+/-modifier]` or a flat number.
///
/// # Examples
///
/// ```rust
/// use hitroll::Dice;
///
/// let damage: Dice = "D3+1".parse().unwrap();
/// assert_eq!(damage.average(), 3.0);
///
/// let attacks = Dice::fixed(4);
/// assert_eq!(attacks.to_string(), "4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DiceRepr", into = "String")]
pub struct Dice {
    /// Number of dice rolled (0 for a flat value).
    pub count: u32,
    /// Faces per die.
    pub sides: u32,
    /// Flat amount added to the roll.
    pub modifier: i32,
}

impl Dice {
    /// A flat value with no dice.
    pub fn fixed(value: i32) -> Self {
        Self {
            count: 0,
            sides: 0,
            modifier: value,
        }
    }

    /// `count` dice of `sides` faces plus `modifier`.
    pub fn roll(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Expected value of the expression.
    pub fn average(&self) -> f64 {
        let per_die = (f64::from(self.sides) + 1.0) / 2.0;
        f64::from(self.count) * per_die + f64::from(self.modifier)
    }

    /// True when no dice are involved.
    pub fn is_fixed(&self) -> bool {
        self.count == 0
    }
}

impl Default for Dice {
    fn default() -> Self {
        Dice::fixed(1)
    }
}

impl FromStr for Dice {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RulesError::InvalidDice(s.to_string());
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.to_ascii_uppercase();

        let Some(d_pos) = text.find('D') else {
            return text.parse::<i32>().map(Dice::fixed).map_err(|_| invalid());
        };

        let count = match &text[..d_pos] {
            "" => 1,
            n => n.parse::<u32>().map_err(|_| invalid())?,
        };

        let rest = &text[d_pos + 1..];
        let (sides, modifier) = match rest.find(['+', '-']) {
            Some(op) => {
                let sides = rest[..op].parse::<u32>().map_err(|_| invalid())?;
                let modifier = rest[op..].parse::<i32>().map_err(|_| invalid())?;
                (sides, modifier)
            }
            None => (rest.parse::<u32>().map_err(|_| invalid())?, 0),
        };

        if sides == 0 {
            return Err(invalid());
        }

        Ok(Dice::roll(count, sides, modifier))
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            return write!(f, "{}", self.modifier);
        }
        if self.count != 1 {
            write!(f, "{}", self.count)?;
        }
        write!(f, "D{}", self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

/// Wire shape: a bare number or an expression string.
#[derive(Deserialize)]
#[serde(untagged)]
enum DiceRepr {
    Number(i32),
    Text(String),
}

impl TryFrom<DiceRepr> for Dice {
    type Error = RulesError;

    fn try_from(repr: DiceRepr) -> Result<Self, Self::Error> {
        match repr {
            DiceRepr::Number(n) => Ok(Dice::fixed(n)),
            DiceRepr::Text(s) => s.parse(),
        }
    }
}

impl From<Dice> for String {
    fn from(dice: Dice) -> Self {
        dice.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expressions() {
        assert_eq!("3".parse::<Dice>().unwrap(), Dice::fixed(3));
        assert_eq!("D6".parse::<Dice>().unwrap(), Dice::roll(1, 6, 0));
        assert_eq!("2d3+1".parse::<Dice>().unwrap(), Dice::roll(2, 3, 1));
        assert_eq!("D6 - 1".parse::<Dice>().unwrap(), Dice::roll(1, 6, -1));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("D".parse::<Dice>().is_err());
        assert!("D0".parse::<Dice>().is_err());
        assert!("xD6".parse::<Dice>().is_err());
        assert!("".parse::<Dice>().is_err());
    }

    #[test]
    fn test_average() {
        assert_eq!(Dice::roll(1, 6, 0).average(), 3.5);
        assert_eq!(Dice::roll(2, 6, 0).average(), 7.0);
        assert_eq!(Dice::roll(1, 3, 3).average(), 5.0);
        assert_eq!(Dice::fixed(2).average(), 2.0);
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["4", "D6", "2D3", "D6+2", "D3-1"] {
            let dice: Dice = text.parse().unwrap();
            assert_eq!(dice.to_string(), text);
        }
    }

    #[test]
    fn test_serde_accepts_number_or_string() {
        let fixed: Dice = serde_json::from_str("2").unwrap();
        let rolled: Dice = serde_json::from_str("\"D6+1\"").unwrap();
        assert_eq!(fixed, Dice::fixed(2));
        assert_eq!(rolled.average(), 4.5);
        assert_eq!(serde_json::to_string(&rolled).unwrap(), "\"D6+1\"");
    }
}
