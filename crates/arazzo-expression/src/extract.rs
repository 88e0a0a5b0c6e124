use crate::error::ExpressionError;

/// Return the text enclosed in balanced braces, e.g. `{$inputs.id}` -> `$inputs.id`.
///
/// Every character must sit inside a brace pair. Inner braces are balanced but not kept.
pub fn extract(input: &str) -> Result<String, ExpressionError> {
    let mut depth = 0usize;
    let mut opened_at = 0usize;
    let mut result = String::with_capacity(input.len());

    for (position, character) in input.char_indices() {
        match character {
            '{' => {
                if depth == 0 {
                    opened_at = position;
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(ExpressionError::MismatchedClosingBrace { position });
                }
                depth -= 1;
            }
            _ if depth > 0 => result.push(character),
            _ => return Err(ExpressionError::OutsideBraces { character, position }),
        }
    }

    if depth != 0 {
        return Err(ExpressionError::MismatchedOpeningBrace { position: opened_at });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_braced_expression() {
        assert_eq!(
            extract("{$workflows.foo.inputs.username}").unwrap(),
            "$workflows.foo.inputs.username"
        );
    }

    #[test]
    fn test_extract_errors() {
        assert_eq!(
            extract("$inputs.id}").unwrap_err(),
            ExpressionError::OutsideBraces {
                character: '$',
                position: 0
            }
        );
        assert_eq!(
            extract("{$inputs.id}}").unwrap_err(),
            ExpressionError::MismatchedClosingBrace { position: 12 }
        );
        assert_eq!(
            extract("{$inputs.id").unwrap_err(),
            ExpressionError::MismatchedOpeningBrace { position: 0 }
        );
        assert_eq!(
            extract("{$url} ").unwrap_err(),
            ExpressionError::OutsideBraces {
                character: ' ',
                position: 6
            }
        );
    }

    #[test]
    fn test_nested_braces_are_dropped() {
        assert_eq!(extract("{{$url}}").unwrap(), "$url");
        assert_eq!(extract("").unwrap(), "");
    }
}
