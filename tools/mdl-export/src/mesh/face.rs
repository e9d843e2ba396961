//! Face record resolution and triangulation
//!
//! Face tokens are `pos`, `pos/tex`, `pos//norm` or `pos/tex/norm`. Indices
//! are 1-based, or negative to count back from the end of the stream as it
//! stands when the face is read.

use smallvec::SmallVec;

use crate::error::{AttributeKind, ConvertError, Location};

/// One polygon corner: zero-based indices into the attribute streams.
///
/// This is the vertex deduplication key, so a missing texcoord or normal
/// (`None`) never compares equal to index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceVertexRef {
    pub position: u32,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

impl FaceVertexRef {
    pub fn new(position: u32, texcoord: Option<u32>, normal: Option<u32>) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// Three corners in clockwise-front order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [FaceVertexRef; 3]);

/// Stream lengths at the time a face is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSizes {
    pub positions: usize,
    pub texcoords: usize,
    pub normals: usize,
}

/// Corners of a single face. Triangles and quads stay inline.
pub type FaceCorners = SmallVec<[FaceVertexRef; 4]>;

/// Map a raw face index to a zero-based stream index.
///
/// `n > 0` maps to `n - 1`, `n < 0` maps to `size + n`, and zero is rejected.
pub fn resolve_index(raw: i64, size: usize, kind: AttributeKind) -> Result<u32, ConvertError> {
    let out_of_range = || ConvertError::IndexOutOfRange {
        kind,
        index: raw,
        size,
        location: Location::default(),
    };

    let resolved = match raw {
        0 => {
            return Err(ConvertError::ZeroIndex {
                kind,
                token: raw.to_string(),
                location: Location::default(),
            });
        }
        n if n > 0 => n - 1,
        n => i64::try_from(size).map_err(|_| out_of_range())? + n,
    };

    if resolved < 0 || resolved as u64 >= size as u64 {
        return Err(out_of_range());
    }
    u32::try_from(resolved).map_err(|_| out_of_range())
}

/// Parse one `pos[/tex][/norm]` token
pub fn parse_face_vertex(token: &str, sizes: StreamSizes) -> Result<FaceVertexRef, ConvertError> {
    let mut parts = token.split('/');

    let parse = |part: &str, size: usize, kind: AttributeKind| -> Result<u32, ConvertError> {
        let raw: i64 = part.parse().map_err(|_| ConvertError::malformed(token))?;
        resolve_index(raw, size, kind).map_err(|err| match err {
            ConvertError::ZeroIndex { kind, location, .. } => ConvertError::ZeroIndex {
                kind,
                token: token.to_owned(),
                location,
            },
            other => other,
        })
    };

    let position = match parts.next() {
        Some(part) if !part.is_empty() => parse(part, sizes.positions, AttributeKind::Position)?,
        _ => return Err(ConvertError::malformed(token)),
    };
    let texcoord = match parts.next() {
        Some(part) if !part.is_empty() => Some(parse(part, sizes.texcoords, AttributeKind::Texcoord)?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(part) if !part.is_empty() => Some(parse(part, sizes.normals, AttributeKind::Normal)?),
        _ => None,
    };

    Ok(FaceVertexRef::new(position, texcoord, normal))
}

/// Resolve every corner token of a face record (the tokens after `f`)
pub fn parse_face<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
    sizes: StreamSizes,
) -> Result<FaceCorners, ConvertError> {
    tokens
        .into_iter()
        .map(|token| parse_face_vertex(token, sizes))
        .collect()
}

/// Fan-triangulate a polygon around its first corner.
///
/// Emits `(v0, v[i+2], v[i+1])`, reversing the source scan order so the
/// front face winds clockwise.
pub fn triangulate(corners: &[FaceVertexRef]) -> Result<Vec<Triangle>, ConvertError> {
    if corners.len() < 3 {
        return Err(ConvertError::DegenerateFace {
            vertices: corners.len(),
            location: Location::default(),
        });
    }

    Ok((0..corners.len() - 2)
        .map(|i| Triangle([corners[0], corners[i + 2], corners[i + 1]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: StreamSizes = StreamSizes {
        positions: 8,
        texcoords: 4,
        normals: 2,
    };

    #[test]
    fn test_resolve_positive_and_negative() {
        assert_eq!(resolve_index(1, 8, AttributeKind::Position).unwrap(), 0);
        assert_eq!(resolve_index(8, 8, AttributeKind::Position).unwrap(), 7);
        assert_eq!(resolve_index(-1, 8, AttributeKind::Position).unwrap(), 7);
        assert_eq!(resolve_index(-8, 8, AttributeKind::Position).unwrap(), 0);
    }

    #[test]
    fn test_resolve_zero_is_error() {
        for size in [0, 1, 100] {
            let err = resolve_index(0, size, AttributeKind::Normal).unwrap_err();
            assert!(matches!(err, ConvertError::ZeroIndex { .. }));
        }
    }

    #[test]
    fn test_resolve_out_of_range() {
        assert!(matches!(
            resolve_index(9, 8, AttributeKind::Position),
            Err(ConvertError::IndexOutOfRange { index: 9, size: 8, .. })
        ));
        assert!(matches!(
            resolve_index(-9, 8, AttributeKind::Texcoord),
            Err(ConvertError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_face_vertex_forms() {
        assert_eq!(
            parse_face_vertex("3", SIZES).unwrap(),
            FaceVertexRef::new(2, None, None)
        );
        assert_eq!(
            parse_face_vertex("3/4", SIZES).unwrap(),
            FaceVertexRef::new(2, Some(3), None)
        );
        assert_eq!(
            parse_face_vertex("3//2", SIZES).unwrap(),
            FaceVertexRef::new(2, None, Some(1))
        );
        assert_eq!(
            parse_face_vertex("-1/-1/-1", SIZES).unwrap(),
            FaceVertexRef::new(7, Some(3), Some(1))
        );
    }

    #[test]
    fn test_absent_is_not_zero() {
        let absent = parse_face_vertex("1//", SIZES).unwrap();
        let first = parse_face_vertex("1/1/1", SIZES).unwrap();
        assert_ne!(absent, first);
        assert_eq!(absent.texcoord, None);
    }

    #[test]
    fn test_zero_token_reports_token() {
        let err = parse_face_vertex("1/0/1", SIZES).unwrap_err();
        match err {
            ConvertError::ZeroIndex { kind, token, .. } => {
                assert_eq!(kind, AttributeKind::Texcoord);
                assert_eq!(token, "1/0/1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_token() {
        assert!(matches!(
            parse_face_vertex("a/1/1", SIZES),
            Err(ConvertError::MalformedRecord { .. })
        ));
        assert!(matches!(
            parse_face_vertex("/1/1", SIZES),
            Err(ConvertError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_triangulate_quad_winding() {
        let [a, b, c, d] = [0, 1, 2, 3].map(|i| FaceVertexRef::new(i, None, None));
        let triangles = triangulate(&[a, b, c, d]).unwrap();
        assert_eq!(triangles, vec![Triangle([a, c, b]), Triangle([a, d, c])]);
    }

    #[test]
    fn test_triangulate_ngon_count() {
        let corners: Vec<_> = (0..7).map(|i| FaceVertexRef::new(i, None, None)).collect();
        let triangles = triangulate(&corners).unwrap();
        assert_eq!(triangles.len(), 5);
        assert!(triangles.iter().all(|t| t.0[0] == corners[0]));
    }

    #[test]
    fn test_triangulate_degenerate() {
        let corners = [FaceVertexRef::new(0, None, None); 2];
        assert!(matches!(
            triangulate(&corners),
            Err(ConvertError::DegenerateFace { vertices: 2, .. })
        ));
    }

    #[test]
    fn test_parse_face_keeps_order() {
        let corners = parse_face("1/1/1 2/2/1 3/3/2".split_whitespace(), SIZES).unwrap();
        assert_eq!(corners.len(), 3);
        assert_eq!(corners[2], FaceVertexRef::new(2, Some(2), Some(1)));
    }
}
