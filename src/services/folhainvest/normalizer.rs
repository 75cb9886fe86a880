//! 本地化数值解析
//!
//! 巴西格式：千分位 `.`、小数点 `,`、货币 "R$ 1.234,56"、排名 "37º"、百分比 "12,3%"。
//! 抽取层的每个数值字段都只经过这里的一个函数。

use crate::error::{PortalError, Result};

/// 千分位分隔符
const GROUPING_SEPARATOR: char = '.';
/// 小数分隔符
const DECIMAL_SEPARATOR: char = ',';
/// 序数标记
const ORDINAL_MARKERS: &[char] = &['º', 'ª', '°'];

/// "1.234" -> 1234
pub fn parse_integer(text: &str) -> Result<i64> {
    let cleaned = text.trim().replace(GROUPING_SEPARATOR, "");
    cleaned
        .parse::<i64>()
        .map_err(|_| PortalError::format("integer", text))
}

/// "1.234,56" -> 1234.56
pub fn parse_decimal(text: &str) -> Result<f64> {
    let cleaned = text
        .trim()
        .replace(GROUPING_SEPARATOR, "")
        .replace(DECIMAL_SEPARATOR, ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PortalError::format("decimal", text)),
    }
}

/// "12º lugar" -> 12
pub fn parse_rank(text: &str) -> Result<u32> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| PortalError::format("rank", text))?;
    let value = parse_integer(token.trim_end_matches(ORDINAL_MARKERS))
        .map_err(|_| PortalError::format("rank", text))?;
    u32::try_from(value).map_err(|_| PortalError::format("rank", text))
}

/// "R$ 1.234,56" -> 1234.56，取第二个空白分隔的片段
pub fn parse_currency(text: &str) -> Result<f64> {
    let amount = text
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| PortalError::format("currency", text))?;
    parse_decimal(amount).map_err(|_| PortalError::format("currency", text))
}

/// "12,3%" -> 12.3
pub fn parse_percentage(text: &str) -> Result<f64> {
    parse_decimal(&text.replace('%', "")).map_err(|_| PortalError::format("percentage", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("12.000").unwrap(), 12000);
        assert_eq!(parse_integer("1.234").unwrap(), 1234);
        assert_eq!(parse_integer(" 7 ").unwrap(), 7);
        assert_eq!(parse_integer("-1.500").unwrap(), -1500);
        assert!(parse_integer("").is_err());
        assert!(parse_integer("12,5").is_err());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1.234,56").unwrap(), 1234.56);
        assert_eq!(parse_decimal("-0,75").unwrap(), -0.75);
        assert_eq!(parse_decimal("12").unwrap(), 12.0);
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("inf").is_err());
    }

    #[test]
    fn test_parse_rank() {
        assert_eq!(parse_rank("3º").unwrap(), 3);
        assert_eq!(parse_rank("12º lugar").unwrap(), 12);
        assert_eq!(parse_rank("1.024ª").unwrap(), 1024);
        assert!(parse_rank("").is_err());
        assert!(parse_rank("-3º").is_err());
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("R$ 987,65").unwrap(), 987.65);
        assert_eq!(parse_currency("  R$ 1.234,56 ").unwrap(), 1234.56);
        // 不间断空格
        assert_eq!(parse_currency("R$\u{a0}100.000,00").unwrap(), 100000.0);
        assert!(matches!(
            parse_currency("987,65"),
            Err(PortalError::Format { expected: "currency", .. })
        ));
    }

    #[test]
    fn test_parse_percentage() {
        assert_eq!(parse_percentage("12,3%").unwrap(), 12.3);
        assert_eq!(parse_percentage("-4,56 %").unwrap(), -4.56);
        assert_eq!(parse_percentage("0,00").unwrap(), 0.0);
        assert!(parse_percentage("%").is_err());
    }
}
