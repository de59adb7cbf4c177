//! Statement reader: turns the token stream into an ordered statement list.
//!
//! Positional arguments are arity-checked here (PBRT fixes them per
//! directive); keyword parameters are parsed from `"type name"` declarations
//! into a typed [`ParamSet`].

use std::collections::VecDeque;

use crate::pbrt::statement::{ParamSet, ParamValue, Statement, StatementKind};
use crate::pbrt::tokenizer::{tokenize, ParseError, ParseResult, Token};

/// Reader over a tokenized document.
pub struct StatementReader {
    tokens: VecDeque<(Token, usize)>,
    current_line: usize,
}

/// Raw parameter value before the declared type is applied.
enum RawValue {
    Number(f32),
    Text(String),
}

impl StatementReader {
    pub fn new(content: &str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(content)?.into(),
            current_line: 1,
        })
    }

    /// Parse a whole document into statements, in document order.
    pub fn read_all(content: &str) -> ParseResult<Vec<Statement>> {
        let mut reader = Self::new(content)?;
        let mut statements = Vec::new();
        while let Some(statement) = reader.next_statement()? {
            statements.push(statement);
        }
        Ok(statements)
    }

    /// Next statement, or `None` at end of document.
    pub fn next_statement(&mut self) -> ParseResult<Option<Statement>> {
        let (token, line) = match self.tokens.pop_front() {
            Some(t) => t,
            None => return Ok(None),
        };
        self.current_line = line;

        let directive = match token {
            Token::Ident(name) => name,
            other => {
                return Err(ParseError::Parse {
                    line,
                    message: format!("expected a directive, found {}", other.describe()),
                })
            }
        };

        let kind = match directive.as_str() {
            "Include" => StatementKind::Include(self.expect_string(&directive)?),
            "WorldBegin" => StatementKind::WorldBegin,
            "WorldEnd" => StatementKind::WorldEnd,
            "AttributeBegin" => StatementKind::AttributeBegin,
            "AttributeEnd" => StatementKind::AttributeEnd,
            "TransformBegin" => StatementKind::TransformBegin,
            "TransformEnd" => StatementKind::TransformEnd,
            "ObjectBegin" => StatementKind::ObjectBegin(self.expect_string(&directive)?),
            "ObjectEnd" => StatementKind::ObjectEnd,
            "ObjectInstance" => StatementKind::ObjectInstance(self.expect_string(&directive)?),
            "Identity" => StatementKind::Identity,
            "ReverseOrientation" => StatementKind::ReverseOrientation,
            "Translate" => StatementKind::Translate(self.expect_numbers(&directive)?),
            "Scale" => StatementKind::Scale(self.expect_numbers(&directive)?),
            "Rotate" => StatementKind::Rotate(self.expect_numbers(&directive)?),
            "LookAt" => StatementKind::LookAt(self.expect_numbers(&directive)?),
            "Transform" => StatementKind::Transform(Box::new(self.expect_numbers(&directive)?)),
            "ConcatTransform" => {
                StatementKind::ConcatTransform(Box::new(self.expect_numbers(&directive)?))
            }
            "CoordinateSystem" => StatementKind::CoordinateSystem(self.expect_string(&directive)?),
            "CoordSysTransform" | "CoordinateSystemTransform" => {
                StatementKind::CoordinateSystemTransform(self.expect_string(&directive)?)
            }
            "NamedMaterial" => StatementKind::NamedMaterial(self.expect_string(&directive)?),
            "Material" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Material { kind, params }
            }
            "MakeNamedMaterial" => {
                let name = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::MakeNamedMaterial { name, params }
            }
            "Texture" => {
                let name = self.expect_string(&directive)?;
                let value_type = self.expect_string(&directive)?;
                let class = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Texture {
                    name,
                    value_type,
                    class,
                    params,
                }
            }
            "LightSource" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::LightSource { kind, params }
            }
            "AreaLightSource" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::AreaLightSource { kind, params }
            }
            "Shape" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Shape { kind, params }
            }
            "Camera" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Camera { kind, params }
            }
            "Sampler" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Sampler { kind, params }
            }
            "Film" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Film { kind, params }
            }
            "PixelFilter" | "Filter" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Filter { kind, params }
            }
            "Integrator" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Integrator { kind, params }
            }
            "Accelerator" => {
                let kind = self.expect_string(&directive)?;
                let params = self.parse_params()?;
                StatementKind::Accelerator { kind, params }
            }
            other => {
                return Err(ParseError::Parse {
                    line,
                    message: format!("unknown directive: {}", other),
                })
            }
        };

        Ok(Some(Statement { kind, line }))
    }

    fn expect_string(&mut self, directive: &str) -> ParseResult<String> {
        match self.tokens.pop_front() {
            Some((Token::Str(s), line)) => {
                self.current_line = line;
                Ok(s)
            }
            Some((other, line)) => Err(ParseError::Parse {
                line,
                message: format!(
                    "{} expects a quoted string, found {}",
                    directive,
                    other.describe()
                ),
            }),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Read exactly N numbers, with optional surrounding brackets.
    fn expect_numbers<const N: usize>(&mut self, directive: &str) -> ParseResult<[f32; N]> {
        let bracketed = matches!(self.tokens.front(), Some((Token::OpenBracket, _)));
        if bracketed {
            self.tokens.pop_front();
        }

        let mut values = [0.0f32; N];
        for value in values.iter_mut() {
            match self.tokens.pop_front() {
                Some((Token::Number(n), line)) => {
                    self.current_line = line;
                    *value = n;
                }
                Some((other, line)) => {
                    return Err(ParseError::Parse {
                        line,
                        message: format!(
                            "{} expects {} numbers, found {}",
                            directive,
                            N,
                            other.describe()
                        ),
                    })
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }

        if bracketed {
            match self.tokens.pop_front() {
                Some((Token::CloseBracket, _)) => {}
                Some((other, line)) => {
                    return Err(ParseError::Parse {
                        line,
                        message: format!(
                            "{} expects {} numbers, found extra {}",
                            directive,
                            N,
                            other.describe()
                        ),
                    })
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }

        Ok(values)
    }

    /// Parse keyword parameters until the next directive.
    ///
    /// Every declaration is a quoted `"type name"` string, so seeing a bare
    /// identifier means the parameter list is over.
    fn parse_params(&mut self) -> ParseResult<ParamSet> {
        let mut params = ParamSet::new();

        while let Some((Token::Str(_), _)) = self.tokens.front() {
            let (decl, decl_line) = match self.tokens.pop_front() {
                Some((Token::Str(s), line)) => (s, line),
                _ => unreachable!(),
            };
            self.current_line = decl_line;

            let mut parts = decl.split_whitespace();
            let (type_name, param_name) = match (parts.next(), parts.next()) {
                (Some(t), Some(n)) => (t.to_string(), n.to_string()),
                _ => {
                    return Err(ParseError::Parse {
                        line: decl_line,
                        message: format!("malformed parameter declaration: \"{}\"", decl),
                    })
                }
            };

            let raw = self.read_raw_values(decl_line)?;
            let value = self.typed_value(&type_name, &param_name, raw, decl_line)?;
            params.insert(param_name, value);
        }

        Ok(params)
    }

    /// Read a single value or a bracketed list of values.
    fn read_raw_values(&mut self, decl_line: usize) -> ParseResult<Vec<RawValue>> {
        let mut values = Vec::new();

        let bracketed = matches!(self.tokens.front(), Some((Token::OpenBracket, _)));
        if bracketed {
            self.tokens.pop_front();
            loop {
                match self.tokens.pop_front() {
                    Some((Token::CloseBracket, _)) => break,
                    Some((Token::Number(n), line)) => {
                        self.current_line = line;
                        values.push(RawValue::Number(n));
                    }
                    Some((Token::Str(s), line)) | Some((Token::Ident(s), line)) => {
                        self.current_line = line;
                        values.push(RawValue::Text(s));
                    }
                    Some((Token::OpenBracket, line)) => {
                        return Err(ParseError::Parse {
                            line,
                            message: "nested brackets in parameter value".to_string(),
                        })
                    }
                    None => return Err(ParseError::UnexpectedEof),
                }
            }
        } else {
            match self.tokens.pop_front() {
                Some((Token::Number(n), line)) => {
                    self.current_line = line;
                    values.push(RawValue::Number(n));
                }
                Some((Token::Str(s), line)) | Some((Token::Ident(s), line)) => {
                    self.current_line = line;
                    values.push(RawValue::Text(s));
                }
                Some((other, line)) => {
                    return Err(ParseError::Parse {
                        line,
                        message: format!("expected a parameter value, found {}", other.describe()),
                    })
                }
                None => return Err(ParseError::UnexpectedEof),
            }
        }

        if values.is_empty() {
            return Err(ParseError::Parse {
                line: decl_line,
                message: "empty parameter value list".to_string(),
            });
        }

        Ok(values)
    }

    fn typed_value(
        &self,
        type_name: &str,
        param_name: &str,
        raw: Vec<RawValue>,
        line: usize,
    ) -> ParseResult<ParamValue> {
        let all_numbers = |raw: &[RawValue]| -> ParseResult<Vec<f32>> {
            raw.iter()
                .map(|v| match v {
                    RawValue::Number(n) => Ok(*n),
                    RawValue::Text(s) => Err(ParseError::Parse {
                        line,
                        message: format!(
                            "parameter \"{}\" expects numeric values, found \"{}\"",
                            param_name, s
                        ),
                    }),
                })
                .collect()
        };

        let single_text = |raw: Vec<RawValue>| -> ParseResult<String> {
            match raw.into_iter().next() {
                Some(RawValue::Text(s)) => Ok(s),
                _ => Err(ParseError::Parse {
                    line,
                    message: format!("parameter \"{}\" expects a string value", param_name),
                }),
            }
        };

        let grouped = |values: Vec<f32>| -> ParseResult<Vec<glam::Vec3>> {
            if values.len() % 3 != 0 {
                return Err(ParseError::Parse {
                    line,
                    message: format!(
                        "parameter \"{}\" expects a multiple of 3 values, got {}",
                        param_name,
                        values.len()
                    ),
                });
            }
            Ok(values
                .chunks(3)
                .map(|c| glam::Vec3::new(c[0], c[1], c[2]))
                .collect())
        };

        match type_name {
            "float" => Ok(ParamValue::Float(all_numbers(&raw)?)),
            "integer" => Ok(ParamValue::Int(
                all_numbers(&raw)?.into_iter().map(|v| v as i32).collect(),
            )),
            "bool" => {
                let text = single_text(raw)?;
                match text.as_str() {
                    "true" => Ok(ParamValue::Bool(true)),
                    "false" => Ok(ParamValue::Bool(false)),
                    other => Err(ParseError::Parse {
                        line,
                        message: format!(
                            "parameter \"{}\" expects true or false, got \"{}\"",
                            param_name, other
                        ),
                    }),
                }
            }
            "string" => Ok(ParamValue::String(single_text(raw)?)),
            "texture" => Ok(ParamValue::Texture(single_text(raw)?)),
            "point" | "point3" | "vector" | "vector3" => {
                Ok(ParamValue::Point(grouped(all_numbers(&raw)?)?))
            }
            "normal" | "normal3" => Ok(ParamValue::Normal(grouped(all_numbers(&raw)?)?)),
            "rgb" | "color" => {
                let values = all_numbers(&raw)?;
                if values.len() != 3 {
                    return Err(ParseError::Parse {
                        line,
                        message: format!(
                            "parameter \"{}\" expects 3 values, got {}",
                            param_name,
                            values.len()
                        ),
                    });
                }
                Ok(ParamValue::Rgb(glam::Vec3::new(
                    values[0], values[1], values[2],
                )))
            }
            // Spectra are either sampled values or a data-file reference
            "spectrum" => match raw.first() {
                Some(RawValue::Text(_)) => Ok(ParamValue::String(single_text(raw)?)),
                _ => Ok(ParamValue::Float(all_numbers(&raw)?)),
            },
            "blackbody" => Ok(ParamValue::Float(all_numbers(&raw)?)),
            other => {
                log::warn!(
                    "line {}: unknown parameter type \"{}\" for \"{}\", keeping raw values",
                    line,
                    other,
                    param_name
                );
                match raw.first() {
                    Some(RawValue::Text(_)) => Ok(ParamValue::String(single_text(raw)?)),
                    _ => Ok(ParamValue::Float(all_numbers(&raw)?)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_world_block() {
        let statements = StatementReader::read_all("WorldBegin\nWorldEnd").unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].kind, StatementKind::WorldBegin);
        assert_eq!(statements[0].line, 1);
        assert_eq!(statements[1].kind, StatementKind::WorldEnd);
        assert_eq!(statements[1].line, 2);
    }

    #[test]
    fn test_read_transform_ops() {
        let src = "Translate 1 2 3\nRotate 45 0 0 1\nLookAt 0 0 5 0 0 0 0 1 0";
        let statements = StatementReader::read_all(src).unwrap();
        assert_eq!(
            statements[0].kind,
            StatementKind::Translate([1.0, 2.0, 3.0])
        );
        assert_eq!(
            statements[1].kind,
            StatementKind::Rotate([45.0, 0.0, 0.0, 1.0])
        );
        assert!(matches!(statements[2].kind, StatementKind::LookAt(_)));
    }

    #[test]
    fn test_read_bracketed_matrix() {
        let src = "Transform [1 0 0 0  0 1 0 0  0 0 1 0  0 0 0 1]";
        let statements = StatementReader::read_all(src).unwrap();
        match &statements[0].kind {
            StatementKind::Transform(m) => assert_eq!(m[0], 1.0),
            other => panic!("expected Transform, got {:?}", other),
        }
    }

    #[test]
    fn test_read_shape_with_params() {
        let src = r#"Shape "sphere" "float radius" 2.5 "bool flip" ["true"]"#;
        let statements = StatementReader::read_all(src).unwrap();
        match &statements[0].kind {
            StatementKind::Shape { kind, params } => {
                assert_eq!(kind, "sphere");
                assert_eq!(params.float("radius"), Some(2.5));
                assert_eq!(params.get("flip"), Some(&ParamValue::Bool(true)));
            }
            other => panic!("expected Shape, got {:?}", other),
        }
    }

    #[test]
    fn test_read_texture_statement() {
        let src = r#"Texture "wood" "spectrum" "imagemap" "string filename" ["wood.png"]"#;
        let statements = StatementReader::read_all(src).unwrap();
        match &statements[0].kind {
            StatementKind::Texture {
                name,
                value_type,
                class,
                params,
            } => {
                assert_eq!(name, "wood");
                assert_eq!(value_type, "spectrum");
                assert_eq!(class, "imagemap");
                assert_eq!(params.string("filename"), Some("wood.png"));
            }
            other => panic!("expected Texture, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_error() {
        let err = StatementReader::read_all("Translate 1 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof));

        let err = StatementReader::read_all("Translate 1 2 WorldBegin").unwrap_err();
        assert!(matches!(err, ParseError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_unknown_directive() {
        let err = StatementReader::read_all("FrobnicateScene").unwrap_err();
        assert!(matches!(err, ParseError::Parse { .. }));
    }

    #[test]
    fn test_point_grouping() {
        let src = r#"Shape "trianglemesh" "point P" [0 0 0  1 0 0  0 1 0] "integer indices" [0 1 2]"#;
        let statements = StatementReader::read_all(src).unwrap();
        match &statements[0].kind {
            StatementKind::Shape { params, .. } => {
                assert_eq!(params.vectors("P").unwrap().len(), 3);
                assert_eq!(params.ints("indices"), Some(&[0, 1, 2][..]));
            }
            other => panic!("expected Shape, got {:?}", other),
        }
    }
}
