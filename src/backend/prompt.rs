use std::path::Path;

/// Instruction sent for every file. The model must answer with a single JSON object.
pub fn malicious_code_prompt(code: &str, path: &Path) -> String {
    format!(
        r#"You are a security expert analyzing code for malicious intent.

Please analyze the following code from file '{path}' and determine if it contains malicious code.
Malicious code includes but is not limited to: backdoors, data exfiltration, encryption for ransomware,
system manipulation without consent, obfuscated harmful functionality, etc.

CODE TO ANALYZE:
```
{code}
```

Provide your analysis in the following JSON format:
{{
    "is_malicious": true/false,
    "malicious_probability": 0.0-1.0,
    "reasoning": "detailed explanation of why the code is or isn't considered malicious",
    "identified_threats": ["list", "of", "specific", "threats", "if", "any"]
}}

Only respond with valid JSON. Do not include any other text in your response.
"#,
        path = path.display(),
    )
}
