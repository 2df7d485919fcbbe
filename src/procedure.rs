//! Procedure descriptors: the parameter list handed to the external
//! compilation pipeline, and the header each language needs around a
//! generated body.

use crate::target::{Architecture, Language};
use crate::types::{DataType, Direction, TypedOperand};

#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: DataType,
    pub direction: Direction,
    /// Array extent, as source text (`"n"`, `"16"`). `None` for scalars.
    pub dimension: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, ty: impl Into<DataType>, direction: Direction) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.into(),
            direction,
            dimension: None,
        }
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    pub fn is_array(&self) -> bool {
        self.dimension.is_some()
    }

    /// The parameter as an operand usable in expressions.
    pub fn operand(&self) -> TypedOperand {
        TypedOperand::variable(&self.name, self.ty.clone()).with_direction(self.direction)
    }

    fn c_decl(&self, language: Language, architecture: Architecture) -> String {
        let decl = self.ty.decl(language, architecture);
        let pointer = self.is_array() || self.direction != Direction::In;
        if !pointer {
            return format!("{} {}", decl, self.name);
        }
        let constant = if self.direction == Direction::In { "const " } else { "" };
        let space = if language == Language::OpenCl { "__global " } else { "" };
        format!("{}{}{} * {}", space, constant, decl, self.name)
    }

    fn fortran_decl(&self, architecture: Architecture) -> String {
        let mut line = format!(
            "{}, intent({})",
            self.ty.decl(Language::Fortran, architecture),
            self.direction.fortran_intent()
        );
        if let Some(dimension) = &self.dimension {
            line.push_str(&format!(", dimension({})", dimension));
        }
        format!("{} :: {}", line, self.name)
    }
}

/// A generated procedure: name, ordered parameters, optional return type.
#[derive(Clone, Debug, PartialEq)]
pub struct Procedure {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<DataType>,
}

impl Procedure {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            return_type: None,
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, ty: impl Into<DataType>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// First line of the procedure, opening its body.
    ///
    /// OpenCL and CUDA kernels always return `void`.
    pub fn header(&self, language: Language, architecture: Architecture) -> String {
        if language == Language::Fortran {
            let names: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
            let kind = if self.return_type.is_some() {
                "FUNCTION"
            } else {
                "SUBROUTINE"
            };
            return format!("{} {}({})", kind, self.name, names.join(", "));
        }

        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| p.c_decl(language, architecture))
            .collect();
        let qualifier = match language {
            Language::OpenCl => "__kernel void".to_string(),
            Language::Cuda => "__global__ void".to_string(),
            _ => match &self.return_type {
                Some(ty) => ty.decl(language, architecture),
                None => "void".to_string(),
            },
        };
        format!("{} {}({}) {{", qualifier, self.name, params.join(", "))
    }

    /// Declarations opening the body. Only Fortran declares its
    /// parameters there.
    pub fn declarations(&self, language: Language, architecture: Architecture) -> Vec<String> {
        if language != Language::Fortran {
            return Vec::new();
        }
        let mut lines = vec!["implicit none".to_string()];
        lines.extend(self.parameters.iter().map(|p| p.fortran_decl(architecture)));
        if let Some(ty) = &self.return_type {
            lines.push(format!("{} :: {}", ty.decl(language, architecture), self.name));
        }
        lines
    }

    /// Line closing the body.
    pub fn footer(&self, language: Language) -> String {
        match (language, &self.return_type) {
            (Language::Fortran, Some(_)) => format!("END FUNCTION {}", self.name),
            (Language::Fortran, None) => format!("END SUBROUTINE {}", self.name),
            _ => "}".to_string(),
        }
    }
}
