//! Fixed instruction text sent to the agent.

/// Behavior and schema contract appended to the first turn of every run.
pub const EXTRACTION_CONTRACT: &str = r#"The RRID might not be mentioned in the search results, and the RRID is not the same as the resourceId. The resourceId is an etag and is given in this query.

Most importantly, be sure every observation you extract is about the named resource. False negatives (missing an observation) are acceptable; false positives (observations attributed to the wrong resource or the wrong DOI) are not. Do not invent synonyms for cell lines or animal models beyond the ones given here, except for the cases described below.

Be ABSOLUTELY SURE the observation matches the resource:
- Similar names are different resources. If SK-MEL-238 is queried and the results mention SK-MEL-2 or SK-MEL-131, those are not observations about SK-MEL-238.
- If the search results never mention the resource, they do not contain relevant observations and must be ignored.
- Author initials and other acronyms can look like resource names (cell line SZ-NF4 versus author initials SZ).
- Papers sometimes give the full resource name once and then an abbreviation, especially for animal models (B6;129S2-Trp53tm1Tyj Nf1tm1Tyj/J is also known as NPcis). Observations using such an abbreviation may be extracted.
- Minor differences in punctuation, spacing or capitalization are the same resource (FTC133 and FTC-133, YST1 and YST-1, U87-MG and U87MG and U87 MG, sNF94.3 and SNF94.3).
- If a resource name or synonym is extremely generic, such as Nf1+/- or NF1-mut or NF1-null, do not search for it and do not extract observations about it.

Do NOT include observations whose focus is methodology, acknowledgements, ethics, culture conditions or quality control, for example <example>the cell lines were sequenced with whole genome sequencing</example>, <example>the cell lines were acquired from...</example>, <example>The mouse genotypes were verified by PCR.</example>, <example>The mice were evaluated twice daily.</example> or <example>the cell line was confirmed to be negative for mycoplasma contamination</example>. Only data-driven scientific observations are wanted. Do not hallucinate observations.

Take the "doi" field of every observation from the metadata of the search result chunk the observation came from. DO NOT make up a DOI.

Respond ONLY with a JSON list of observation objects with the keys resourceId, resourceName, resourceType, observationText, observationType, observationPhase, observationTime, observationTimeUnits and doi. Fill missing values (for example an observationTime that does not apply) with "" so the JSON stays valid. If there are no relevant observations for this resource in the search results, return [null] and nothing else. Do not write any preamble before the JSON or any text after it. The JSON must be valid and must be wrapped in <json_response> </json_response> tags.

Observations should be summarized and succinct, but every scientific observation about the resource is wanted, however complex or jargon-heavy.

Here are some examples:
<example_1>
For the query "NF1OPG, an Animal Model, resource ID 76ff3bea-5a2c-4d9c-b3c4-513842c11af4", given the search result:
<example_search_result>
retrievedReferences": [{"content": {"text": "Nf1OPG mice with optic glioma tumors consistently developed preneoplastic lesions by 3 months of age that progressed to optic gliomas over the next 3 to 6 months. By 7-9 months of age, 100% of mice had symptomatic optic glioma and required euthanasia due to progressive neurological symptoms."}, "location": {"s3Location": {"uri": "s3://nf-tools-database-publications/nftc_pdfs/nftc_10.1158_1078-0432.CCR-13-1740.pdf"}, "type": "S3"}, "metadata": {"x-amz-bedrock-kb-source-uri": "s3://nf-tools-database-publications/nftc_pdfs/nftc_10.1158_1078-0432.CCR-13-1740.pdf", "doi": ["https://doi.org/10.1158/1078-0432.CCR-13-1740"]}}
</example_search_result>
<example_response>
<json_response>
[{"resourceId":"76ff3bea-5a2c-4d9c-b3c4-513842c11af4","resourceName":"NF1OPG","resourceType":["Animal Model"],"observationText":"In the NF1OPG mouse model, preneoplastic lesions consistently developed by 3 months of age and progressed to symptomatic optic gliomas requiring euthanasia by 7-9 months due to neurological symptoms in 100% of mice.","observationType":["Tumor progression","Neurological symptoms"],"observationPhase":"juvenile","observationTime":3,"observationTimeUnits":"months","doi":"https://doi.org/10.1158/1078-0432.CCR-13-1740"}]
</json_response>
</example_response>
</example_1>
<example_2>
For the query "NF90-8, a Cell Line, resourceId 0f404e70-2acf-4877-bcd5-6da81d9fa41e", given the search result:
<example_search_result>
retrievedReferences": [{"content": {"text": "In contrast, we identified gains in genomic regions containing receptors, especially a highly gained region containing PDGFRA and KIT in two NF1-related cell lines (S462 and NF90-8) (Figure 4B)."}, "location": {"s3Location": {"uri": "s3://nf-tools-database-publications/nftc_pdfs/nftc_10.1016.j.isci.2023.106096.pdf"}, "type": "S3"}, "metadata": {"x-amz-bedrock-kb-source-uri": "s3://nf-tools-database-publications/nftc_pdfs/nftc_10.1016.j.isci.2023.106096.pdf", "doi": ["https://www.doi.org/10.1016/j.isci.2023.106096"]}}
</example_search_result>
<example_response>
<json_response>
[{"resourceId":"0f404e70-2acf-4877-bcd5-6da81d9fa41e","resourceName":"NF90-8","resourceType":["Cell Line"],"observationText":"The NF90-8 cell line had a highly gained region containing the PDGFRA and KIT receptors.","observationType":["Genomics"],"observationPhase":"","observationTime":"","observationTimeUnits":"","doi":"https://www.doi.org/10.1016/j.isci.2023.106096"}]
</json_response>
</example_response>
</example_2>"#;
